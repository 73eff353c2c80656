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

//! The number codec: shortest round-trip `f64`
//! formatting, fast `f64` parsing, and integer/hex formatting.

mod atod;
mod dtoa;
mod itoa;
mod tables;

pub use atod::{atod, atod_parts};
pub use dtoa::dtoa;
pub use itoa::{htoa, itoa, lhtoa, ltoa};
