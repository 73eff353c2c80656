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

//! A JSON parsing and printing library built around an arena-backed
//! value tree and a shared lexer core that drives both a DOM builder
//! and a streaming SAX emitter.
//!
//! The tree returned by [`dom::parse_dom`] borrows its backing storage
//! (a byte slice and an [`mem::Arena`]) rather than owning it, so
//! parsing is a single pass with the minimum copying RFC 8259 strings
//! allow: unescaped string literals are referenced in place, and only
//! literals containing an escape sequence get copied into the string
//! arena. [`sax::parse_sax`] walks the identical grammar but calls a
//! handler per event instead of building a tree, for callers who want
//! to fold a document into their own structure without the
//! intermediate allocation.
//!
//! ```
//! use flashjson::{mem::Arena, dom, options::ParseOptions};
//!
//! let arena = Arena::default();
//! let value = dom::parse_dom(br#"{"a":1,"b":[true,null]}"#, &arena, &ParseOptions::default())
//!     .unwrap();
//! assert_eq!(value.as_object().unwrap().len(), 2);
//! ```

pub mod dom;
pub mod error;
pub mod lexer;
pub mod mem;
pub mod num;
pub mod options;
pub mod print;
pub mod sax;
pub mod source;
pub mod value;

pub use error::{Error, Result};
pub use mem::Arena;
pub use options::{ParseOptions, PrintOptions, Strictness};
pub use value::{Children, Kind, ObjectIndex, Payload, StringRef, Value};

use std::fs::File;
use std::io::Read;

use source::FileSource;

/// Parses the file at `path` into a value tree allocated in `arena`.
///
/// The whole file is read into an owned buffer first (via
/// [`FileSource::read_to_end`]) rather than driving the lexer directly
/// off a [`source::ByteSource`]: the DOM and SAX drivers both operate
/// on a borrowed `&[u8]` so that string literals without escapes can be
/// referenced zero-copy, which a streaming file source cannot offer
/// once its buffer compacts out from under an in-progress parse.
///
/// The file's contents are leaked to produce the `'static` slice the
/// returned tree borrows from, the same trade-off
/// [`print::print_dom_to_path`]'s counterpart makes in reverse (a
/// one-shot load with no obvious owner to hand the buffer back to).
/// Callers parsing many files, or who want to reclaim the buffer, should
/// read the file themselves and call [`dom::parse_dom`] directly.
pub fn parse_dom_file<'a>(path: &str, arena: &'a Arena, options: &ParseOptions) -> Result<Value<'a>> {
    let file = File::open(path).map_err(|e| Error::io(0, e))?;
    let read_size = options.file_read_size.unwrap_or(options::DEFAULT_READ_SIZE);
    let bytes = FileSource::new(file, read_size).read_to_end()?;
    let input: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    dom::parse_dom(input, arena, options)
}

/// Reads the file at `path` in full and drives `handler` with SAX
/// events over its contents. See [`parse_dom_file`] for why
/// the whole file is buffered up front rather than streamed through a
/// [`source::ByteSource`].
pub fn parse_sax_file(path: &str, handler: &mut dyn sax::SaxHandler, options: &ParseOptions) -> Result<()> {
    let mut file = File::open(path).map_err(|e| Error::io(0, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| Error::io(0, e))?;
    sax::parse_sax_owned(&bytes, handler, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn parse_dom_file_reads_and_parses_a_real_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"a":[1,2,3]}"#).unwrap();
        let arena = Arena::default();
        let value = parse_dom_file(file.path().to_str().unwrap(), &arena, &ParseOptions::default()).unwrap();
        let arr = value.as_object().unwrap().get_linear(b"a").unwrap().as_array().unwrap();
        assert_eq!(arr.len(), 3);
    }

    #[test]
    fn parse_sax_file_reads_and_emits_events() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[1,2,3]").unwrap();
        let mut count = 0usize;
        let mut handler = |_event: sax::Event<'_>| {
            count += 1;
            sax::Control::Continue
        };
        parse_sax_file(file.path().to_str().unwrap(), &mut handler, &ParseOptions::default()).unwrap();
        // 3 ints + 1 array start + 1 array finish.
        assert_eq!(count, 5);
    }
}
