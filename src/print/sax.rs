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

//! The SAX printer: a [`crate::sax::SaxHandler`]
//! that writes events straight to a sink as they arrive, without ever
//! materializing a tree — useful for streaming re-formatting or
//! transcoding a document strictness level without an intermediate DOM.

use std::io::Write;

use crate::num::{dtoa, htoa, itoa, lhtoa, ltoa};
use crate::options::PrintOptions;
use crate::sax::{Control, Event, SaxHandler};
use crate::value::StringRef;

struct Frame {
    is_array: bool,
    child_count: usize,
}

/// Prints the event stream it receives as JSON text to `W`. Maintains
/// its own depth stack of `(container-kind, number-of-siblings-
/// emitted)` frames, from which separator placement,
/// indentation, and key emission are computed without ever storing a
/// node.
pub struct SaxPrinter<W: Write> {
    out: W,
    options: PrintOptions,
    stack: Vec<Frame>,
    /// First write error encountered; once set, further events are
    /// ignored (the driver unwinds on [`Control::Stop`], but a printer
    /// has no way to report failure through that path other than
    /// recording it for [`SaxPrinter::finish`]).
    error: Option<std::io::Error>,
}

impl<W: Write> SaxPrinter<W> {
    pub fn new(out: W, options: PrintOptions) -> Self {
        Self { out, options, stack: Vec::new(), error: None }
    }

    /// Consumes the printer, flushing the sink and returning any
    /// deferred write error.
    pub fn finish(mut self) -> std::io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn before_value(&mut self) {
        // A value only gets a leading separator/indent when it is a
        // child of some open container; the document root gets
        // neither (mirroring the DOM printer's `write_value` at
        // `depth == 0`, which is never itself preceded by `write_indent`).
        if let Some(frame) = self.stack.last_mut() {
            if frame.child_count > 0 {
                self.try_write(b",");
            }
            frame.child_count += 1;
            self.write_indent();
        }
    }

    fn write_indent(&mut self) {
        if !self.options.formatted {
            return;
        }
        self.try_write(b"\n");
        let depth = self.stack.len();
        for _ in 0..depth {
            self.try_write(b"\t");
        }
    }

    fn write_key(&mut self, key: &StringRef<'_>) {
        if key.is_empty() && self.stack.last().map(|f| f.is_array).unwrap_or(true) {
            return;
        }
        self.write_string(key);
        self.try_write(b":");
        if self.options.formatted {
            self.try_write(b" ");
        }
    }

    fn write_string(&mut self, s: &StringRef<'_>) {
        self.try_write(b"\"");
        if !s.needs_escape() {
            self.try_write(s.as_bytes());
        } else {
            let mut out = Vec::with_capacity(s.len() + 2);
            super::write_escaped_into(&mut out, &self.options, s.as_bytes());
            self.try_write(&out);
        }
        self.try_write(b"\"");
    }

    fn try_write(&mut self, bytes: &[u8]) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.out.write_all(bytes) {
            self.error = Some(e);
        }
    }

    fn open(&mut self, key: &StringRef<'_>, is_array: bool) {
        self.before_value();
        self.write_key(key);
        self.try_write(if is_array { b"[" } else { b"{" });
        self.stack.push(Frame { is_array, child_count: 0 });
    }

    fn close(&mut self, is_array: bool) {
        let had_children = self.stack.last().map(|f| f.child_count > 0).unwrap_or(false);
        self.stack.pop();
        if had_children {
            self.write_indent();
        }
        self.try_write(if is_array { b"]" } else { b"}" });
    }
}

impl<W: Write> SaxHandler for SaxPrinter<W> {
    fn event(&mut self, event: Event<'_>) -> Control {
        match event {
            Event::Null { key } => {
                self.before_value();
                self.write_key(&key);
                self.try_write(b"null");
            }
            Event::Bool { key, value } => {
                self.before_value();
                self.write_key(&key);
                self.try_write(if value { b"true" } else { b"false" });
            }
            Event::Int32 { key, value } => {
                self.before_value();
                self.write_key(&key);
                let mut digits = Vec::new();
                itoa(value, &mut digits);
                self.try_write(&digits);
            }
            Event::Int64 { key, value } => {
                self.before_value();
                self.write_key(&key);
                let mut digits = Vec::new();
                ltoa(value, &mut digits);
                self.try_write(&digits);
            }
            Event::Uhex32 { key, value } => {
                self.before_value();
                self.write_key(&key);
                let mut digits = Vec::new();
                htoa(value, &mut digits);
                self.try_write(&digits);
            }
            Event::Uhex64 { key, value } => {
                self.before_value();
                self.write_key(&key);
                let mut digits = Vec::new();
                lhtoa(value, &mut digits);
                self.try_write(&digits);
            }
            Event::Float64 { key, value } => {
                self.before_value();
                self.write_key(&key);
                let mut digits = Vec::new();
                dtoa(value, &mut digits);
                self.try_write(&digits);
            }
            Event::String { key, value } => {
                self.before_value();
                self.write_key(&key);
                self.write_string(&value);
            }
            Event::ArrayStart { key } => self.open(&key, true),
            Event::ObjectStart { key } => self.open(&key, false),
            Event::ArrayFinish { .. } => self.close(true),
            Event::ObjectFinish { .. } => self.close(false),
        }

        if self.error.is_some() {
            Control::Stop
        } else {
            Control::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;
    use crate::sax::parse_sax;

    #[test]
    fn prints_the_spec_scenario_compactly() {
        let mut printer = SaxPrinter::new(Vec::new(), PrintOptions::compact());
        parse_sax(br#"{"x":[1,2]}"#, &mut printer, &ParseOptions::default()).unwrap();
        let out = printer.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#"{"x":[1,2]}"#);
    }

    #[test]
    fn empty_containers_print_without_a_spurious_comma() {
        let mut printer = SaxPrinter::new(Vec::new(), PrintOptions::compact());
        parse_sax(b"[]", &mut printer, &ParseOptions::default()).unwrap();
        let out = printer.finish().unwrap();
        assert_eq!(out, b"[]");
    }

    #[test]
    fn formatted_mode_indents_nested_containers() {
        let mut printer = SaxPrinter::new(Vec::new(), PrintOptions::formatted());
        parse_sax(br#"{"a":1}"#, &mut printer, &ParseOptions::default()).unwrap();
        let out = printer.finish().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\n\t\"a\": 1\n}");
    }
}
