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

//! The printer: DOM and SAX emission, either to a
//! growable in-memory buffer or to a file, in formatted (indented) or
//! compact mode.

mod buffer;
mod sax;

pub use buffer::GrowableBuffer;
pub use sax::SaxPrinter;

use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::error::{Error, Result};
use crate::num::{dtoa, htoa, itoa, lhtoa, ltoa};
use crate::options::PrintOptions;
use crate::value::{Payload, StringRef, Value};

/// A write sink that tracks how many bytes it has accepted, so an I/O
/// failure can be reported with the offset of the last byte
/// successfully written.
struct Counted<W> {
    inner: W,
    count: usize,
}

impl<W: Write> Counted<W> {
    fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).map_err(|e| Error::io(self.count, e))?;
        self.count += bytes.len();
        Ok(())
    }

    fn write_byte(&mut self, b: u8) -> Result<()> {
        self.write_all(&[b])
    }
}

/// Counts the nodes in `value`'s subtree, including itself.
pub fn count_nodes(value: &Value<'_>) -> usize {
    1 + match value.payload() {
        Payload::Array(items) => items.iter().map(count_nodes).sum(),
        Payload::Object(children) => children.iter().map(count_nodes).sum(),
        _ => 0,
    }
}

/// Prints `value` to a caller-provided in-memory [`GrowableBuffer`],
/// returning the finished bytes. Takes `options` by value so that a
/// present [`PrintOptions::reuse_buffer`] can be moved into the
/// buffer rather than cloned.
pub fn print_dom_to_vec(value: &Value<'_>, mut options: PrintOptions) -> Result<Vec<u8>> {
    let buf = match options.reuse_buffer.take() {
        Some(reused) => GrowableBuffer::from_vec(reused, options.buffer_plus_size),
        None => GrowableBuffer::with_capacity(options.initial_capacity(), options.buffer_plus_size),
    };
    let mut out = Counted::new(buf);
    write_value(value, &options, 0, &mut out)?;
    Ok(out.inner.into_vec())
}

/// Prints `value` to the file at `path`, using a fixed-size flush
/// buffer rather than the growable in-memory sizing heuristic (a
/// file descriptor gets a fixed flush buffer instead).
pub fn print_dom_to_path(value: &Value<'_>, path: &str, options: &PrintOptions) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(0, e))?;
    let writer = BufWriter::with_capacity(8192, file);
    let mut out = Counted::new(writer);
    write_value(value, options, 0, &mut out)?;
    out.inner.flush().map_err(|e| Error::io(out.count, e))?;
    Ok(())
}

/// Prints `value` per `options`, routing to `options.path` when
/// present and to a fresh in-memory buffer otherwise. Returns the printed bytes, or an empty vector when a
/// file path was used.
pub fn print_dom(value: &Value<'_>, options: PrintOptions) -> Result<Vec<u8>> {
    match &options.path {
        Some(path) => {
            print_dom_to_path(value, path, &options)?;
            Ok(Vec::new())
        }
        None => print_dom_to_vec(value, options),
    }
}

fn write_indent<W: Write>(out: &mut Counted<W>, options: &PrintOptions, depth: usize) -> Result<()> {
    if options.formatted {
        out.write_byte(b'\n')?;
        for _ in 0..depth {
            out.write_byte(b'\t')?;
        }
    }
    Ok(())
}

fn write_key<W: Write>(out: &mut Counted<W>, options: &PrintOptions, key: &StringRef<'_>) -> Result<()> {
    write_string(out, options, key)?;
    out.write_byte(b':')?;
    if options.formatted {
        out.write_byte(b' ')?;
    }
    Ok(())
}

fn write_value<W: Write>(value: &Value<'_>, options: &PrintOptions, depth: usize, out: &mut Counted<W>) -> Result<()> {
    match value.payload() {
        Payload::Null => out.write_all(b"null"),
        Payload::Bool(true) => out.write_all(b"true"),
        Payload::Bool(false) => out.write_all(b"false"),
        Payload::Int32(n) => {
            let mut digits = Vec::new();
            itoa(*n, &mut digits);
            out.write_all(&digits)
        }
        Payload::Int64(n) => {
            let mut digits = Vec::new();
            ltoa(*n, &mut digits);
            out.write_all(&digits)
        }
        Payload::Uhex32(n) => {
            let mut digits = Vec::new();
            htoa(*n, &mut digits);
            out.write_all(&digits)
        }
        Payload::Uhex64(n) => {
            let mut digits = Vec::new();
            lhtoa(*n, &mut digits);
            out.write_all(&digits)
        }
        Payload::Float64(n) => {
            let mut digits = Vec::new();
            dtoa(*n, &mut digits);
            out.write_all(&digits)
        }
        Payload::String(s) => write_string(out, options, s),
        Payload::Array(items) => {
            out.write_byte(b'[')?;
            for (i, child) in items.iter().enumerate() {
                if i > 0 {
                    out.write_byte(b',')?;
                }
                write_indent(out, options, depth + 1)?;
                write_value(child, options, depth + 1, out)?;
            }
            if !items.is_empty() {
                write_indent(out, options, depth)?;
            }
            out.write_byte(b']')
        }
        Payload::Object(children) => {
            out.write_byte(b'{')?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.write_byte(b',')?;
                }
                write_indent(out, options, depth + 1)?;
                write_key(out, options, child.key())?;
                write_value(child, options, depth + 1, out)?;
            }
            if !children.is_empty() {
                write_indent(out, options, depth)?;
            }
            out.write_byte(b'}')
        }
    }
}

/// Writes `s` as a quoted JSON string literal: the fast path (no
/// escaping needed) writes the raw bytes verbatim; the slow path
/// walks byte-by-byte, flushing runs between escape points.
fn write_string<W: Write>(out: &mut Counted<W>, options: &PrintOptions, s: &StringRef<'_>) -> Result<()> {
    out.write_byte(b'"')?;
    if !s.needs_escape() {
        out.write_all(s.as_bytes())?;
    } else {
        let mut buf = Vec::with_capacity(s.len() + 2);
        write_escaped_into(&mut buf, options, s.as_bytes());
        out.write_all(&buf)?;
    }
    out.write_byte(b'"')
}

/// Appends the escaped form of `bytes` to `buf`: runs of bytes needing no escape are copied
/// verbatim, and escape points are replaced by their `\X` form or
/// `\u00XX` for sub-space control bytes. Shared by the `Write`-backed
/// DOM printer above and [`super::SaxPrinter`], which accumulates into
/// a plain `Vec<u8>` before handing it to its own sink.
pub(super) fn write_escaped_into(buf: &mut Vec<u8>, options: &PrintOptions, bytes: &[u8]) {
    let mut run_start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let escape: Option<&[u8]> = match b {
            b'"' => Some(b"\\\""),
            b'\\' => Some(b"\\\\"),
            0x08 => Some(b"\\b"),
            0x0C => Some(b"\\f"),
            b'\n' => Some(b"\\n"),
            b'\r' => Some(b"\\r"),
            b'\t' => Some(b"\\t"),
            _ if b < 0x20 => None, // handled below, may or may not escape
            _ => continue,
        };

        if escape.is_none() && !options.escape_control_bytes {
            continue;
        }

        if run_start < i {
            buf.extend_from_slice(&bytes[run_start..i]);
        }
        match escape {
            Some(form) => buf.extend_from_slice(form),
            None => {
                let mut hex = [b'\\', b'u', b'0', b'0', 0, 0];
                const HEX: &[u8; 16] = b"0123456789abcdef";
                hex[4] = HEX[(b >> 4) as usize];
                hex[5] = HEX[(b & 0xf) as usize];
                buf.extend_from_slice(&hex);
            }
        }
        run_start = i + 1;
    }
    if run_start < bytes.len() {
        buf.extend_from_slice(&bytes[run_start..]);
    }
}
