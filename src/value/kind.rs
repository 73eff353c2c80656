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

//! The tagged value kind.

/// The kind of a [`crate::value::Value`].
///
/// `Uhex32`/`Uhex64` are plain unsigned integers that additionally
/// carry the display hint "print as `0x...`"; keeping them as
/// distinct variants (rather than an integer plus a boolean flag)
/// means the print path never has to consult a second field to know
/// how to render a number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Kind {
    Null,
    Bool,
    Int32,
    Uhex32,
    Int64,
    Uhex64,
    Float64,
    String,
    Array,
    Object,
}

impl Kind {
    /// `true` for `Array`/`Object`, the two kinds that carry a child list.
    #[inline]
    pub const fn is_container(self) -> bool {
        matches!(self, Kind::Array | Kind::Object)
    }

    /// `true` for any of the six numeric kinds.
    #[inline]
    pub const fn is_number(self) -> bool {
        matches!(
            self,
            Kind::Int32 | Kind::Uhex32 | Kind::Int64 | Kind::Uhex64 | Kind::Float64
        )
    }

    /// `true` for `Uhex32`/`Uhex64`, which render with a `0x` prefix.
    #[inline]
    pub const fn is_hex(self) -> bool {
        matches!(self, Kind::Uhex32 | Kind::Uhex64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_predicates() {
        assert!(Kind::Array.is_container());
        assert!(Kind::Object.is_container());
        assert!(!Kind::String.is_container());

        assert!(Kind::Int32.is_number());
        assert!(Kind::Float64.is_number());
        assert!(!Kind::String.is_number());

        assert!(Kind::Uhex32.is_hex());
        assert!(Kind::Uhex64.is_hex());
        assert!(!Kind::Int32.is_hex());
    }
}
