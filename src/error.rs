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

//! Typed error surface for parsing and printing.
//!
//! Every fallible operation in this crate returns [`Result<T>`], whose
//! error variant always carries the byte offset at which the problem
//! was detected, and for lexical/syntactic failures, a short snippet
//! of the offending input.

use std::fmt;

/// Maximum number of context bytes captured alongside a `lex`/`parse` error.
pub const MAX_CONTEXT_LEN: usize = 31;

/// A fixed-capacity copy of the bytes surrounding an error's offset.
///
/// Stored inline (no heap allocation) so that constructing an error
/// never itself fails with OOM.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Context {
    len: u8,
    buf: [u8; MAX_CONTEXT_LEN],
}

impl Context {
    /// Captures up to [`MAX_CONTEXT_LEN`] bytes starting at `offset`.
    pub fn capture(input: &[u8], offset: usize) -> Self {
        let start = offset.min(input.len());
        let end = (start + MAX_CONTEXT_LEN).min(input.len());
        let slice = &input[start..end];

        let mut buf = [0u8; MAX_CONTEXT_LEN];
        buf[..slice.len()].copy_from_slice(slice);

        Self { len: slice.len() as u8, buf }
    }

    /// Returns the captured bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self { len: 0, buf: [0; MAX_CONTEXT_LEN] }
    }
}

/// The error type returned by every parse/print operation in this crate.
///
/// The error surface callers see: `io`,
/// `oom`, `lex`, `parse`, and (SAX-only) `callback_stop`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A read from a file-backed source, or a write to a file-backed
    /// sink, returned fewer bytes than requested (and was not retried).
    #[error("i/o error at offset {offset}: {source}")]
    Io {
        offset: usize,
        #[source]
        source: std::io::Error,
    },

    /// An arena, growable buffer, or read buffer could not grow to the
    /// requested size.
    #[error("out of memory at offset {offset} (requested {requested} bytes)")]
    Oom { offset: usize, requested: usize },

    /// The lexer rejected the input: an unterminated string, a bad
    /// escape, a malformed `\uXXXX` surrogate, or similar.
    #[error("lexical error at offset {offset}: {message}")]
    Lex {
        offset: usize,
        message: &'static str,
        context: Context,
    },

    /// The driver rejected the token stream: a bad literal, a missing
    /// separator, trailing garbage, or a strict-mode violation.
    #[error("parse error at offset {offset}: {message}")]
    Parse {
        offset: usize,
        message: &'static str,
        context: Context,
    },

    /// A SAX callback returned [`crate::sax::Control::Stop`]; this is
    /// reported as an error variant for uniformity with the other
    /// driver outcomes, but callers should usually treat it as a
    /// successful, caller-requested early exit (see
    /// [`crate::sax::parse_sax`]).
    #[error("callback requested stop at offset {offset}")]
    CallbackStop { offset: usize },
}

impl Error {
    /// The byte offset at which this error was detected.
    pub fn offset(&self) -> usize {
        match *self {
            Error::Io { offset, .. } => offset,
            Error::Oom { offset, .. } => offset,
            Error::Lex { offset, .. } => offset,
            Error::Parse { offset, .. } => offset,
            Error::CallbackStop { offset } => offset,
        }
    }

    pub(crate) fn lex(offset: usize, message: &'static str, input: &[u8]) -> Self {
        Error::Lex { offset, message, context: Context::capture(input, offset) }
    }

    pub(crate) fn parse(offset: usize, message: &'static str, input: &[u8]) -> Self {
        Error::Parse { offset, message, context: Context::capture(input, offset) }
    }

    pub(crate) fn oom(offset: usize, requested: usize) -> Self {
        Error::Oom { offset, requested }
    }

    pub(crate) fn io(offset: usize, source: std::io::Error) -> Self {
        Error::Io { offset, source }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
