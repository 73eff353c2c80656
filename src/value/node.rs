// This file is part of flashjson, a JSON library.
// Copyright 2024 The flashjson authors
//
// flashjson is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published
// by the Free Software Foundation, either version 3 of the License,
// or (at your option) any later version.
//
// flashjson is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with flashjson.  If not, see <http://www.gnu.org/licenses/>.

//! The value tree.
//!
//! Children are not linked via raw pointers threaded through both the
//! tree and the arena free list; they live in an arena-backed,
//! insertion-ordered [`bumpalo::collections::Vec`], so the whole tree
//! can be moved or dropped atomically and a child reference is just an
//! index.

use bumpalo::collections::Vec as BVec;

use crate::value::index::ObjectIndex;
use crate::value::kind::Kind;
use crate::value::string::StringRef;

/// A JSON value: a kind tag, an optional key (non-empty for object
/// children), and a payload whose variant always agrees with the kind
/// tag.
#[derive(Debug)]
pub struct Value<'a> {
    key: StringRef<'a>,
    payload: Payload<'a>,
}

/// The tagged payload of a [`Value`]. Kept as a sum type, rather than a
/// union with a sibling kind tag, so the variant and the kind can
/// never disagree.
#[derive(Debug)]
pub enum Payload<'a> {
    Null,
    Bool(bool),
    Int32(i32),
    Uhex32(u32),
    Int64(i64),
    Uhex64(u64),
    Float64(f64),
    String(StringRef<'a>),
    Array(BVec<'a, Value<'a>>),
    Object(Children<'a>),
}

/// An object's children plus its lazily built lookup index.
#[derive(Debug)]
pub struct Children<'a> {
    items: BVec<'a, Value<'a>>,
    index: Option<ObjectIndex>,
}

impl<'a> Children<'a> {
    fn new(items: BVec<'a, Value<'a>>) -> Self {
        Self { items, index: None }
    }

    /// Children in source/insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value<'a>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Value<'a>> {
        self.items.get(position)
    }

    /// Linear by-key scan in source order.
    pub fn get_linear(&self, key: &[u8]) -> Option<&Value<'a>> {
        self.items.iter().find(|v| v.key.as_bytes() == key)
    }

    /// By-key lookup via the sorted-by-hash [`ObjectIndex`], building
    /// the index on first use. Falls back to a confirming linear
    /// fan-out on hash collision.
    pub fn get_indexed(&mut self, key: &[u8]) -> Option<&Value<'a>> {
        if self.index.is_none() {
            self.index = Some(ObjectIndex::build(&self.items));
        }
        let index = self.index.as_ref().unwrap();
        let position = index.lookup(&self.items, key)?;
        self.items.get(position)
    }

    /// Invalidates the cached index; call after any structural edit.
    pub fn invalidate_index(&mut self) {
        self.index = None;
    }

    fn push(&mut self, value: Value<'a>) {
        self.items.push(value);
        self.invalidate_index();
    }
}

impl<'a> Value<'a> {
    /// Constructs a keyless value (array element or document root).
    pub fn new(payload: Payload<'a>) -> Self {
        Self { key: StringRef::EMPTY, payload }
    }

    /// Constructs an object member with the given key.
    pub fn with_key(key: StringRef<'a>, payload: Payload<'a>) -> Self {
        Self { key, payload }
    }

    /// Constructs an empty array using `arena` for its child list.
    pub fn empty_array(arena: &'a bumpalo::Bump) -> Self {
        Self::new(Payload::Array(BVec::new_in(arena)))
    }

    /// Constructs an empty object using `arena` for its child list.
    pub fn empty_object(arena: &'a bumpalo::Bump) -> Self {
        Self::new(Payload::Object(Children::new(BVec::new_in(arena))))
    }

    #[inline]
    pub fn key(&self) -> &StringRef<'a> {
        &self.key
    }

    /// Mutable access to the key, used by the DOM driver to attach a
    /// just-scanned object key to a container value after it has
    /// already been constructed.
    #[inline]
    pub fn key_mut(&mut self) -> &mut StringRef<'a> {
        &mut self.key
    }

    #[inline]
    pub fn payload(&self) -> &Payload<'a> {
        &self.payload
    }

    #[inline]
    pub fn payload_mut(&mut self) -> &mut Payload<'a> {
        &mut self.payload
    }

    /// The value's kind tag.
    pub fn kind(&self) -> Kind {
        match &self.payload {
            Payload::Null => Kind::Null,
            Payload::Bool(_) => Kind::Bool,
            Payload::Int32(_) => Kind::Int32,
            Payload::Uhex32(_) => Kind::Uhex32,
            Payload::Int64(_) => Kind::Int64,
            Payload::Uhex64(_) => Kind::Uhex64,
            Payload::Float64(_) => Kind::Float64,
            Payload::String(_) => Kind::String,
            Payload::Array(_) => Kind::Array,
            Payload::Object(_) => Kind::Object,
        }
    }

    pub fn as_array(&self) -> Option<&[Value<'a>]> {
        match &self.payload {
            Payload::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Children<'a>> {
        match &self.payload {
            Payload::Object(children) => Some(children),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Children<'a>> {
        match &mut self.payload {
            Payload::Object(children) => Some(children),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match &self.payload {
            Payload::String(s) => s.as_str(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.payload {
            Payload::Int32(n) => Some(n as f64),
            Payload::Uhex32(n) => Some(n as f64),
            Payload::Int64(n) => Some(n as f64),
            Payload::Uhex64(n) => Some(n as f64),
            Payload::Float64(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.payload, Payload::Null)
    }

    // -- Tree-editing contracts -----------------------------------------------

    /// Appends `child` as the new last element of this array or
    /// object. Panics if this value is not a container, or if `self`
    /// is an object and `child`'s key is empty in a strict context —
    /// callers building trees programmatically are expected to supply
    /// well-formed children themselves (§3 invariants).
    pub fn add_child(&mut self, child: Value<'a>) {
        match &mut self.payload {
            Payload::Array(items) => items.push(child),
            Payload::Object(children) => children.push(child),
            _ => panic!("add_child called on a non-container value"),
        }
    }

    /// Removes and returns the child at `position`, shifting later
    /// children left to preserve order. Panics on out-of-range.
    pub fn detach_child(&mut self, position: usize) -> Value<'a> {
        match &mut self.payload {
            Payload::Array(items) => items.remove(position),
            Payload::Object(children) => {
                let v = children.items.remove(position);
                children.invalidate_index();
                v
            }
            _ => panic!("detach_child called on a non-container value"),
        }
    }

    /// Replaces the child at `position` with `child`, returning the
    /// value that was there. Panics on out-of-range.
    pub fn replace_child(&mut self, position: usize, child: Value<'a>) -> Value<'a> {
        match &mut self.payload {
            Payload::Array(items) => std::mem::replace(&mut items[position], child),
            Payload::Object(children) => {
                let old = std::mem::replace(&mut children.items[position], child);
                children.invalidate_index();
                old
            }
            _ => panic!("replace_child called on a non-container value"),
        }
    }
}
