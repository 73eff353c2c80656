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

//! The file-descriptor-backed byte source: a growable read
//! buffer refilled on demand, compacted forward as the logical cursor
//! advances past its front.

use std::io::Read;

use crate::error::{Error, Result};
use crate::source::ByteSource;

/// A [`ByteSource`] that reads from any [`std::io::Read`] (a file, a
/// pipe, a `TcpStream`) through a growable buffer. `peek` compacts
/// already-consumed bytes out of the front of the buffer and refills
/// from the reader in increments of `read_size` until either
/// `min_bytes` are available or the reader is exhausted.
pub struct FileSource<R> {
    reader: R,
    buf: Vec<u8>,
    /// Index into `buf` of the logical cursor; bytes before this have
    /// already been consumed and are compacted away on next refill.
    pos: usize,
    /// Total bytes consumed before the start of `buf`, for offset
    /// reporting across compactions.
    consumed: usize,
    read_size: usize,
    eof: bool,
}

impl<R: Read> FileSource<R> {
    pub fn new(reader: R, read_size: usize) -> Self {
        Self { reader, buf: Vec::new(), pos: 0, consumed: 0, read_size: read_size.max(1), eof: false }
    }

    fn compact(&mut self) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.consumed += self.pos;
            self.pos = 0;
        }
    }

    fn fill_once(&mut self) -> Result<usize> {
        let start = self.buf.len();
        self.buf.resize(start + self.read_size, 0);
        let read = self.reader.read(&mut self.buf[start..]).map_err(|e| Error::io(self.offset(), e))?;
        self.buf.truncate(start + read);
        if read == 0 {
            self.eof = true;
        }
        Ok(read)
    }

    /// Drains the reader into a single owned buffer, refilling in
    /// `read_size` increments until exhausted. Used by the file-backed
    /// convenience entry points (e.g. [`crate::parse_dom_file`]), which
    /// hand the whole document to the slice-based DOM/SAX drivers
    /// rather than threading a [`ByteSource`] through the lexer.
    pub fn read_to_end(mut self) -> Result<Vec<u8>> {
        self.compact();
        while !self.eof {
            self.fill_once()?;
        }
        Ok(self.buf)
    }
}

impl<R: Read> ByteSource for FileSource<R> {
    fn peek(&mut self, min_bytes: usize) -> Result<&[u8]> {
        self.compact();
        while self.buf.len() - self.pos < min_bytes && !self.eof {
            log::trace!(
                "flashjson: refilling file source at offset {} (have {}, want {})",
                self.offset(),
                self.buf.len() - self.pos,
                min_bytes
            );
            self.fill_once()?;
        }
        Ok(&self.buf[self.pos..])
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }

    fn offset(&self) -> usize {
        self.consumed + self.pos
    }

    fn at_eof(&self) -> bool {
        self.eof && self.pos >= self.buf.len()
    }
}
