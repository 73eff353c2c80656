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

//! The value model.

mod index;
mod kind;
mod node;
mod string;

pub use index::ObjectIndex;
pub use kind::Kind;
pub use node::{Children, Payload, Value};
pub use string::{StringRef, MAX_STRING_LEN};
