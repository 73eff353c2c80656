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

//! The in-memory byte source: a fixed buffer, optionally
//! writable for reuse-in-place string decoding.

use crate::error::Result;
use crate::source::ByteSource;

enum Backing<'a> {
    ReadOnly(&'a [u8]),
    Writable(&'a mut [u8]),
}

impl Backing<'_> {
    fn as_slice(&self) -> &[u8] {
        match self {
            Backing::ReadOnly(b) => b,
            Backing::Writable(b) => b,
        }
    }
}

/// A [`ByteSource`] over a borrowed, possibly-mutable byte slice. No
/// refill ever happens; `peek` simply reports how much of the buffer
/// remains from the current offset.
pub struct MemorySource<'a> {
    bytes: Backing<'a>,
    offset: usize,
}

impl<'a> MemorySource<'a> {
    /// Wraps a read-only buffer. `advance`/`peek` work; reuse-in-place
    /// decoding is unavailable.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes: Backing::ReadOnly(bytes), offset: 0 }
    }

    /// Wraps a caller-owned, writable buffer, enabling reuse-in-place
    /// string decoding.
    pub fn new_writable(bytes: &'a mut [u8]) -> Self {
        Self { bytes: Backing::Writable(bytes), offset: 0 }
    }
}

impl<'a> ByteSource for MemorySource<'a> {
    fn peek(&mut self, _min_bytes: usize) -> Result<&[u8]> {
        Ok(&self.bytes.as_slice()[self.offset..])
    }

    fn advance(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.bytes.as_slice().len());
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn at_eof(&self) -> bool {
        self.offset >= self.bytes.as_slice().len()
    }

    fn supports_reuse_in_place(&self) -> bool {
        matches!(self.bytes, Backing::Writable(_))
    }

    fn reuse_buffer(&mut self) -> &mut [u8] {
        match &mut self.bytes {
            Backing::Writable(b) => b,
            Backing::ReadOnly(_) => unreachable!("reuse_buffer called on a read-only source"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_clamps_to_buffer_length() {
        let mut src = MemorySource::new(b"ab");
        src.advance(100);
        assert!(src.at_eof());
        assert_eq!(src.offset(), 2);
    }

    #[test]
    fn writable_source_exposes_reuse_buffer() {
        let mut data = *b"abc";
        let mut src = MemorySource::new_writable(&mut data);
        assert!(src.supports_reuse_in_place());
        src.reuse_buffer()[0] = b'z';
        assert_eq!(&data, b"zbc");
    }
}
