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

//! The growable in-memory print buffer:
//! a `Vec<u8>` whose growth, once the initial capacity is exhausted,
//! follows doubling or a configured linear increment, whichever is
//! larger, rather than leaving the growth policy to `Vec`'s own
//! (unspecified) amortized strategy.

use std::io;

/// A [`std::io::Write`] sink over an owned `Vec<u8>` with an explicit
/// growth policy. Used as the DOM/SAX printer's in-memory sink; the
/// file sink uses a plain [`std::io::BufWriter`] instead, since a
/// fixed flush buffer has no analogous "total size" to grow.
pub struct GrowableBuffer {
    buf: Vec<u8>,
    plus_size: usize,
}

impl GrowableBuffer {
    /// Creates a buffer pre-sized to `capacity` bytes, growing afterward in increments of
    /// at least `plus_size`.
    pub fn with_capacity(capacity: usize, plus_size: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity), plus_size: plus_size.max(1) }
    }

    /// Takes ownership of an existing allocation, appending to it
    /// instead of starting from an empty buffer.
    pub fn from_vec(buf: Vec<u8>, plus_size: usize) -> Self {
        Self { buf, plus_size: plus_size.max(1) }
    }

    /// Ensures room for `additional` more bytes, growing by whichever
    /// is larger of doubling the current capacity or adding
    /// `plus_size`, but never by less than `additional` itself.
    fn reserve_for(&mut self, additional: usize) {
        let needed = self.buf.len() + additional;
        if needed <= self.buf.capacity() {
            return;
        }
        let doubled = self.buf.capacity().saturating_mul(2);
        let linear = self.buf.capacity() + self.plus_size;
        let target = doubled.max(linear).max(needed);
        self.buf.reserve(target - self.buf.len());
    }

    /// Consumes the buffer, returning the written bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl io::Write for GrowableBuffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.reserve_for(bytes.len());
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn writes_within_initial_capacity_do_not_reallocate() {
        let mut buf = GrowableBuffer::with_capacity(64, 16);
        let addr_before = buf.buf.as_ptr();
        buf.write_all(b"hello").unwrap();
        assert_eq!(buf.buf.as_ptr(), addr_before);
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn growth_past_capacity_at_least_doubles() {
        let mut buf = GrowableBuffer::with_capacity(4, 1);
        buf.write_all(b"abcdefgh").unwrap();
        assert!(buf.buf.capacity() >= 8);
        assert_eq!(buf.into_vec(), b"abcdefgh");
    }
}
