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

//! The DOM driver: a table-driven top-down parse
//! expressed as an explicit stack of open containers, rather than
//! native recursion, so the parent stack is kept as a growable
//! sequence and deeply nested documents cannot blow the call stack the
//! way naive recursive descent would.

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::lexer::{self, scan_number, scan_string_reuse, scan_string_slice, NumberToken};
use crate::mem::Arena;
use crate::options::{ParseOptions, Strictness};
use crate::value::{Payload, StringRef, Value};

/// Inline capacity of the parent-container stack.
const STACK_INLINE: usize = 16;

/// What the driver is waiting for next.
enum State {
    /// About to read a value (and, if the enclosing container is an
    /// object, the key that precedes it).
    Value,
    /// Just opened a container: only a matching close is legal here
    /// (no comma), covering the empty-container case.
    AfterOpen,
    /// Just finished a value inside a container: a comma (continue)
    /// or the matching close is legal.
    AfterValue,
}

/// Parses `input` into a value tree allocated in `arena`.
/// The returned tree borrows both `input` (for zero-copy string and
/// key data) and `arena` (for containers and any copied string data),
/// so both must outlive the tree.
pub fn parse_dom<'a>(input: &'a [u8], arena: &'a Arena, options: &ParseOptions) -> Result<Value<'a>> {
    parse_dom_impl(input, arena, options, None)
}

/// Parses `input` the same way as [`parse_dom`], except that string
/// literals containing an escape sequence are decoded by overwriting
/// their own bytes in `input` instead of allocating from
/// `arena.strings`. Only legal when the
/// caller owns a writable buffer it no longer needs in its original
/// form, which is why this takes `&'a mut [u8]` where [`parse_dom`]
/// takes `&'a [u8]`.
///
/// `options.reuse_in_place` does not need to be set for this entry
/// point — calling it already commits to reuse mode.
pub fn parse_dom_reuse<'a>(input: &'a mut [u8], arena: &'a Arena, options: &ParseOptions) -> Result<Value<'a>> {
    let reuse = ReuseBuffer { base: input.as_mut_ptr(), len: input.len() };
    // `input`, a `&'a mut [u8]`, reborrows here as `&'a [u8]` because
    // this is its last use: the parse below never touches `input`
    // again, only `reuse`'s raw pointer. Every string-literal window
    // `reuse.window()` hands out later covers bytes at or after the
    // lexer's current cursor, which is always past the end of every
    // range any earlier `StringRef` (zero-copy or reused) already
    // borrows, so the windows never alias a live reference.
    let view: &'a [u8] = input;
    parse_dom_impl(view, arena, options, Some(reuse))
}

/// A raw view over a writable input buffer used only to hand
/// [`scan_string_reuse`] a `&mut [u8]` window for the literal it is
/// currently decoding. Kept separate from the
/// `&'a [u8]` the rest of the driver reads through, since safe Rust
/// has no way to express "this disjoint sub-range of a slice I've
/// already lent out immutably is also mutable" across repeated calls.
#[derive(Clone, Copy)]
struct ReuseBuffer {
    base: *mut u8,
    len: usize,
}

impl ReuseBuffer {
    /// Reconstructs a mutable view of the whole backing buffer.
    ///
    /// # Safety
    /// Every call site passes the resulting window straight into
    /// [`scan_string_reuse`], which only ever reads and writes bytes
    /// from `*pos` (the lexer cursor) forward. The driver's cursor
    /// only advances, so distinct calls never write to bytes an
    /// earlier call already returned as part of a `StringRef`.
    unsafe fn window<'a>(self) -> &'a mut [u8] {
        std::slice::from_raw_parts_mut(self.base, self.len)
    }
}

fn parse_dom_impl<'a>(
    input: &'a [u8],
    arena: &'a Arena,
    options: &ParseOptions,
    reuse: Option<ReuseBuffer>,
) -> Result<Value<'a>> {
    let strict = options.strictness;
    let mut pos = 0usize;
    let mut scratch = Vec::new();

    lexer::skip_whitespace(input, &mut pos);

    // Growable parent stack; starts at capacity 16 and doubles on
    // need, kept inline up to that depth so shallow documents
    // allocate nothing for it.
    let mut stack: SmallVec<[Value<'a>; STACK_INLINE]> = SmallVec::new();
    let mut root: Option<Value<'a>> = None;
    let mut state = State::Value;

    loop {
        match state {
            State::Value => {
                lexer::skip_whitespace(input, &mut pos);

                let key = if matches!(stack.last().map(Value::payload), Some(Payload::Object(_))) {
                    scan_key(input, &mut pos, strict, &mut scratch, arena, reuse)?
                } else {
                    StringRef::EMPTY
                };

                lexer::skip_whitespace(input, &mut pos);
                let value = parse_value(input, &mut pos, strict, arena, key, reuse)?;

                match value {
                    Dispatched::Scalar(v) => {
                        attach_or_finish(&mut stack, &mut root, v)?;
                        state = State::AfterValue;
                    }
                    Dispatched::Opened(container) => {
                        stack.push(container);
                        state = State::AfterOpen;
                    }
                }
            }
            State::AfterOpen | State::AfterValue => {
                lexer::skip_whitespace(input, &mut pos);
                let Some(&b) = input.get(pos) else {
                    if stack.is_empty() {
                        break;
                    }
                    return Err(Error::parse(pos, "unexpected end of input inside container", input));
                };

                let is_array = matches!(stack.last().map(Value::payload), Some(Payload::Array(_)));
                let close = if is_array { b']' } else { b'}' };

                if b == close && stack.last().is_some() {
                    pos += 1;
                    let container = stack.pop().unwrap();
                    attach_or_finish(&mut stack, &mut root, container)?;
                    state = State::AfterValue;
                    continue;
                }

                if stack.is_empty() {
                    // Root scalar already attached; nothing further
                    // but trailing whitespace is legal outside strict
                    // mode.
                    if strict.rejects_trailing_garbage() {
                        return Err(Error::parse(pos, "trailing garbage after root value", input));
                    }
                    break;
                }

                match state {
                    State::AfterOpen => {
                        // Not the matching close, so the container is
                        // non-empty: re-dispatch the byte at `pos` as
                        // the first element instead of consuming it.
                        state = State::Value;
                        continue;
                    }
                    State::AfterValue => {
                        if b == b',' {
                            pos += 1;
                            state = State::Value;
                        } else {
                            return Err(Error::parse(pos, "expected ',' or a closing bracket", input));
                        }
                    }
                    State::Value => unreachable!(),
                }
            }
        }
    }

    let root = root.ok_or_else(|| Error::parse(0, "empty document", input))?;
    if strict.rejects_trailing_garbage() && !matches!(root.kind(), crate::value::Kind::Array | crate::value::Kind::Object) {
        return Err(Error::parse(0, "strict mode requires an object or array root", input));
    }
    Ok(root)
}

enum Dispatched<'a> {
    Scalar(Value<'a>),
    Opened(Value<'a>),
}

fn scan_key<'a>(
    input: &'a [u8],
    pos: &mut usize,
    strict: Strictness,
    scratch: &mut Vec<u8>,
    arena: &'a Arena,
    reuse: Option<ReuseBuffer>,
) -> Result<StringRef<'a>> {
    if input.get(*pos) != Some(&b'"') {
        return Err(Error::parse(*pos, "expected an object key", input));
    }
    *pos += 1;
    let key = scan_string(input, pos, strict, scratch, arena, reuse)?;
    if key.is_empty() && strict.rejects_empty_keys() {
        return Err(Error::parse(*pos, "empty object key", input));
    }
    lexer::skip_whitespace(input, pos);
    if input.get(*pos) != Some(&b':') {
        return Err(Error::parse(*pos, "expected ':' after object key", input));
    }
    *pos += 1;
    Ok(key)
}

/// Scans one string literal (`pos` already past the opening `"`),
/// routing it through whichever of the two materialization strategies
/// `reuse` selects: decode in place into the source buffer, or fall
/// back to `scan_string_slice`'s zero-copy/arena-copy split.
fn scan_string<'a>(
    input: &'a [u8],
    pos: &mut usize,
    strict: Strictness,
    scratch: &mut Vec<u8>,
    arena: &'a Arena,
    reuse: Option<ReuseBuffer>,
) -> Result<StringRef<'a>> {
    match reuse {
        // SAFETY: see `ReuseBuffer::window`.
        Some(r) => unsafe { scan_string_reuse(r.window(), pos, strict, 0) },
        None => Ok(scan_string_slice(input, pos, strict, 0, scratch)?
            .unwrap_or_else(|| StringRef::new(arena.strings.alloc_copy(scratch)))),
    }
}

fn parse_value<'a>(
    input: &'a [u8],
    pos: &mut usize,
    strict: Strictness,
    arena: &'a Arena,
    key: StringRef<'a>,
    reuse: Option<ReuseBuffer>,
) -> Result<Dispatched<'a>> {
    let Some(&b) = input.get(*pos) else {
        return Err(Error::parse(*pos, "expected a value", input));
    };

    match b {
        b'"' => {
            *pos += 1;
            let mut scratch = Vec::new();
            let s = scan_string(input, pos, strict, &mut scratch, arena, reuse)?;
            Ok(Dispatched::Scalar(Value::with_key(key, Payload::String(s))))
        }
        b'{' => {
            *pos += 1;
            let mut v = Value::empty_object(arena.nodes.bump());
            *v.key_mut() = key;
            Ok(Dispatched::Opened(v))
        }
        b'[' => {
            *pos += 1;
            let mut v = Value::empty_array(arena.nodes.bump());
            *v.key_mut() = key;
            Ok(Dispatched::Opened(v))
        }
        b't' if lexer::scan_keyword(input, pos, b"true") => {
            Ok(Dispatched::Scalar(Value::with_key(key, Payload::Bool(true))))
        }
        b'f' if lexer::scan_keyword(input, pos, b"false") => {
            Ok(Dispatched::Scalar(Value::with_key(key, Payload::Bool(false))))
        }
        b'n' if lexer::scan_keyword(input, pos, b"null") => {
            Ok(Dispatched::Scalar(Value::with_key(key, Payload::Null)))
        }
        b'n' if strict.accepts_bare_specials() && lexer::scan_keyword(input, pos, b"nan") => {
            Ok(Dispatched::Scalar(Value::with_key(key, Payload::Float64(f64::NAN))))
        }
        b'i' if strict.accepts_bare_specials() && lexer::scan_keyword(input, pos, b"inf") => {
            Ok(Dispatched::Scalar(Value::with_key(key, Payload::Float64(f64::INFINITY))))
        }
        b'-' if strict.accepts_bare_specials() && lexer::scan_keyword(input, pos, b"-inf") => {
            Ok(Dispatched::Scalar(Value::with_key(key, Payload::Float64(f64::NEG_INFINITY))))
        }
        b'-' | b'+' | b'0'..=b'9' => {
            let token = scan_number(input, pos, strict, 0)?;
            let payload = match token {
                NumberToken::Int32(n) => Payload::Int32(n),
                NumberToken::Uhex32(n) => Payload::Uhex32(n),
                NumberToken::Int64(n) => Payload::Int64(n),
                NumberToken::Uhex64(n) => Payload::Uhex64(n),
                NumberToken::Float64(n) => Payload::Float64(n),
            };
            Ok(Dispatched::Scalar(Value::with_key(key, payload)))
        }
        _ => Err(Error::parse(*pos, "unexpected byte at start of value", input)),
    }
}

/// Appends `value` to the current parent on the stack, or sets it as
/// the root if the stack is empty.
fn attach_or_finish<'a>(
    stack: &mut [Value<'a>],
    root: &mut Option<Value<'a>>,
    value: Value<'a>,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.add_child(value);
    } else {
        *root = Some(value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Kind;

    fn parse(input: &str) -> Value<'static> {
        let arena = Box::leak(Box::new(Arena::default()));
        let input: &'static [u8] = Box::leak(input.as_bytes().to_vec().into_boxed_slice());
        parse_dom(input, arena, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn parses_empty_array_and_object() {
        assert_eq!(parse("[]").kind(), Kind::Array);
        assert_eq!(parse("{}").kind(), Kind::Object);
    }

    #[test]
    fn parses_mixed_object_per_spec_scenario() {
        let v = parse("{\"a\":1,\"b\":[true,null,-2]}");
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        let b = obj.get_linear(b"b").unwrap();
        let arr = b.as_array().unwrap();
        assert_eq!(arr.len(), 3);
        assert!(matches!(arr[2].payload(), Payload::Int32(-2)));
    }

    #[test]
    fn rejects_trailing_garbage_in_strict_mode() {
        let arena = Arena::default();
        let input = b"{} garbage";
        let err = parse_dom(input, &arena, &ParseOptions::strict()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn allows_trailing_garbage_in_relaxed_mode() {
        let arena = Arena::default();
        let input = b"1 garbage";
        assert!(parse_dom(input, &arena, &ParseOptions::default()).is_ok());
    }

    #[test]
    fn surrogate_pair_scenario_round_trips_to_expected_utf8() {
        let v = parse("\"\\uD83D\\uDE00\"");
        assert_eq!(v.as_str().unwrap().as_bytes(), &[0xF0, 0x9F, 0x98, 0x80]);
    }

    #[test]
    fn rejects_bare_special_floats_above_relaxed() {
        let arena = Arena::default();
        let mut opts = ParseOptions::strict();
        opts.strictness = crate::options::Strictness::Strict1;
        assert!(parse_dom(b"nan", &arena, &opts).is_err());
    }

    #[test]
    fn reuse_mode_decodes_escaped_strings_in_place() {
        let arena = Arena::default();
        let mut buf = br#"{"a":"x\ny","b":"plain"}"#.to_vec();
        let v = parse_dom_reuse(&mut buf, &arena, &ParseOptions::default()).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.get_linear(b"a").unwrap().as_str().unwrap(), "x\ny");
        assert_eq!(obj.get_linear(b"b").unwrap().as_str().unwrap(), "plain");
    }

    #[test]
    fn reuse_mode_agrees_with_ordinary_parse_on_shape() {
        let arena = Arena::default();
        let mut buf = br#"["one\t1","two\t2","three\t3"]"#.to_vec();
        let reused = parse_dom_reuse(&mut buf, &arena, &ParseOptions::default()).unwrap();
        let arr = reused.as_array().unwrap();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr[0].as_str().unwrap(), "one\t1");
        assert_eq!(arr[1].as_str().unwrap(), "two\t2");
        assert_eq!(arr[2].as_str().unwrap(), "three\t3");
    }
}
