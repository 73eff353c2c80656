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

//! The SAX driver: the same state machine as the DOM
//! driver, but instead of building a tree it maintains a "path" — a
//! stack of (container-kind, key) frames — and calls a caller-supplied
//! [`SaxHandler`] on every scalar, every container open, and every
//! container close.

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::lexer::{self, scan_number, scan_string_slice, NumberToken};
use crate::options::{ParseOptions, Strictness};
use crate::value::StringRef;

/// Inline capacity of the container path stack; see
/// [`crate::dom`]'s `STACK_INLINE` for the rationale.
const STACK_INLINE: usize = 16;

/// What a [`SaxHandler`] callback returns: whether the driver should
/// keep going or stop, letting a callback terminate parsing gracefully.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Control {
    Continue,
    Stop,
}

/// One SAX event. `key` is empty for array elements and the document
/// root.
#[derive(Debug)]
pub enum Event<'a> {
    Null { key: StringRef<'a> },
    Bool { key: StringRef<'a>, value: bool },
    Int32 { key: StringRef<'a>, value: i32 },
    Uhex32 { key: StringRef<'a>, value: u32 },
    Int64 { key: StringRef<'a>, value: i64 },
    Uhex64 { key: StringRef<'a>, value: u64 },
    Float64 { key: StringRef<'a>, value: f64 },
    String { key: StringRef<'a>, value: StringRef<'a> },
    ArrayStart { key: StringRef<'a> },
    ArrayFinish { key: StringRef<'a> },
    ObjectStart { key: StringRef<'a> },
    ObjectFinish { key: StringRef<'a> },
}

/// Receives [`Event`]s from [`parse_sax`] in depth-first document
/// order. Implemented as a trait
/// (rather than a closure bound) so a handler can carry state — an
/// output buffer, a path filter, a running checksum — without an
/// extra capture-by-reference dance at the call site.
pub trait SaxHandler {
    fn event(&mut self, event: Event<'_>) -> Control;
}

impl<F> SaxHandler for F
where
    F: FnMut(Event<'_>) -> Control,
{
    fn event(&mut self, event: Event<'_>) -> Control {
        self(event)
    }
}

enum State {
    Value,
    AfterOpen,
    AfterValue,
}

struct Frame<'a> {
    is_array: bool,
    key: StringRef<'a>,
}

/// Parses `input`, an in-memory buffer, and drives `handler` through
/// the resulting event sequence; no tree is ever materialized.
/// Never allocates except for the string-escape scratch buffer
/// and the container path stack.
///
/// Returns `Ok(())` if the document was consumed to completion (or,
/// in relaxed mode, to the end of a trailing-garbage-tolerant root).
/// If `handler` ever returns [`Control::Stop`], every still-open
/// container is unwound with a synthetic finish event (innermost
/// first) and this function returns `Err(Error::CallbackStop { .. })`
/// — see that variant's documentation for why a caller-requested stop
/// is reported through the error channel.
pub fn parse_sax<'a>(input: &'a [u8], handler: &mut dyn SaxHandler, options: &ParseOptions) -> Result<()> {
    parse_sax_inner(input, handler, options, false)
}

/// As [`parse_sax`], but every [`StringRef`] handed to `handler` is
/// marked [`StringRef::is_owned`]. Intended for callers who have slurped a file-backed
/// source into an owned buffer via [`crate::source::FileSource`]
/// before driving the parse — see [`crate::parse_sax_file`].
pub fn parse_sax_owned<'a>(input: &'a [u8], handler: &mut dyn SaxHandler, options: &ParseOptions) -> Result<()> {
    parse_sax_inner(input, handler, options, true)
}

fn mark<'a>(s: StringRef<'a>, owned: bool) -> StringRef<'a> {
    if owned {
        StringRef::new_owned(s.as_bytes())
    } else {
        s
    }
}

fn parse_sax_inner<'a>(
    input: &'a [u8],
    handler: &mut dyn SaxHandler,
    options: &ParseOptions,
    owned: bool,
) -> Result<()> {
    let strict = options.strictness;
    let mut pos = 0usize;
    let mut scratch = Vec::new();
    let mut scanned_any_root = false;

    lexer::skip_whitespace(input, &mut pos);

    let mut stack: SmallVec<[Frame<'a>; STACK_INLINE]> = SmallVec::new();
    let mut state = State::Value;

    macro_rules! stop_now {
        () => {{
            unwind(&mut stack, &mut *handler, owned);
            return Err(Error::CallbackStop { offset: pos });
        }};
    }

    loop {
        match state {
            State::Value => {
                lexer::skip_whitespace(input, &mut pos);

                let key = if stack.last().map(|f| !f.is_array).unwrap_or(false) {
                    scan_key(input, &mut pos, strict, &mut scratch)?
                } else {
                    StringRef::EMPTY
                };
                let key = mark(key, owned);

                lexer::skip_whitespace(input, &mut pos);
                let outcome = dispatch_value(input, &mut pos, strict, key, handler, owned)?;
                scanned_any_root = true;

                match outcome {
                    Dispatched::Scalar(Control::Stop) => stop_now!(),
                    Dispatched::Scalar(Control::Continue) => state = State::AfterValue,
                    Dispatched::Opened { is_array, key, control: Control::Stop } => {
                        stack.push(Frame { is_array, key });
                        stop_now!();
                    }
                    Dispatched::Opened { is_array, key, control: Control::Continue } => {
                        stack.push(Frame { is_array, key });
                        state = State::AfterOpen;
                    }
                }
            }
            State::AfterOpen | State::AfterValue => {
                lexer::skip_whitespace(input, &mut pos);
                let Some(&b) = input.get(pos) else {
                    if stack.is_empty() {
                        break;
                    }
                    return Err(Error::parse(pos, "unexpected end of input inside container", input));
                };

                let is_array = stack.last().map(|f| f.is_array).unwrap_or(false);
                let close = if is_array { b']' } else { b'}' };

                if b == close && !stack.is_empty() {
                    pos += 1;
                    let frame = stack.pop().unwrap();
                    let event = if frame.is_array {
                        Event::ArrayFinish { key: frame.key }
                    } else {
                        Event::ObjectFinish { key: frame.key }
                    };
                    if handler.event(event) == Control::Stop {
                        stop_now!();
                    }
                    state = State::AfterValue;
                    continue;
                }

                if stack.is_empty() {
                    if strict.rejects_trailing_garbage() {
                        return Err(Error::parse(pos, "trailing garbage after root value", input));
                    }
                    break;
                }

                match state {
                    State::AfterOpen => {
                        // Not the matching close, so the container is
                        // non-empty: re-dispatch the byte at `pos` as
                        // the first element instead of consuming it.
                        state = State::Value;
                        continue;
                    }
                    State::AfterValue => {
                        if b == b',' {
                            pos += 1;
                            state = State::Value;
                        } else {
                            return Err(Error::parse(pos, "expected ',' or a closing bracket", input));
                        }
                    }
                    State::Value => unreachable!(),
                }
            }
        }
    }

    if !scanned_any_root {
        return Err(Error::parse(0, "empty document", input));
    }
    Ok(())
}

/// Unwinds every still-open frame, innermost first, calling `handler`
/// once per container with the ordinary finish event, emitted early.
fn unwind(stack: &mut SmallVec<[Frame<'_>; STACK_INLINE]>, handler: &mut dyn SaxHandler, owned: bool) {
    while let Some(frame) = stack.pop() {
        let key = mark(frame.key, owned);
        let event = if frame.is_array {
            Event::ArrayFinish { key }
        } else {
            Event::ObjectFinish { key }
        };
        handler.event(event);
    }
}

enum Dispatched<'a> {
    Scalar(Control),
    Opened { is_array: bool, key: StringRef<'a>, control: Control },
}

fn scan_key<'a>(
    input: &'a [u8],
    pos: &mut usize,
    strict: Strictness,
    scratch: &mut Vec<u8>,
) -> Result<StringRef<'a>> {
    if input.get(*pos) != Some(&b'"') {
        return Err(Error::parse(*pos, "expected an object key", input));
    }
    *pos += 1;
    let start = *pos;
    let key = scan_string_slice(input, pos, strict, 0, scratch)?
        .unwrap_or_else(|| StringRef::with_flag(&input[start..*pos - 1], true));
    if key.is_empty() && strict.rejects_empty_keys() {
        return Err(Error::parse(*pos, "empty object key", input));
    }
    lexer::skip_whitespace(input, pos);
    if input.get(*pos) != Some(&b':') {
        return Err(Error::parse(*pos, "expected ':' after object key", input));
    }
    *pos += 1;
    Ok(key)
}

fn dispatch_value<'a>(
    input: &'a [u8],
    pos: &mut usize,
    strict: Strictness,
    key: StringRef<'a>,
    handler: &mut dyn SaxHandler,
    owned: bool,
) -> Result<Dispatched<'a>> {
    let Some(&b) = input.get(*pos) else {
        return Err(Error::parse(*pos, "expected a value", input));
    };

    match b {
        b'"' => {
            *pos += 1;
            let start = *pos;
            let mut scratch = Vec::new();
            let s = scan_string_slice(input, pos, strict, 0, &mut scratch)?
                .unwrap_or_else(|| StringRef::with_flag(&input[start..*pos - 1], true));
            let s = mark(s, owned);
            let control = handler.event(Event::String { key, value: s });
            Ok(Dispatched::Scalar(control))
        }
        b'{' => {
            *pos += 1;
            let control = handler.event(Event::ObjectStart { key });
            Ok(Dispatched::Opened { is_array: false, key, control })
        }
        b'[' => {
            *pos += 1;
            let control = handler.event(Event::ArrayStart { key });
            Ok(Dispatched::Opened { is_array: true, key, control })
        }
        b't' if lexer::scan_keyword(input, pos, b"true") => {
            Ok(Dispatched::Scalar(handler.event(Event::Bool { key, value: true })))
        }
        b'f' if lexer::scan_keyword(input, pos, b"false") => {
            Ok(Dispatched::Scalar(handler.event(Event::Bool { key, value: false })))
        }
        b'n' if lexer::scan_keyword(input, pos, b"null") => {
            Ok(Dispatched::Scalar(handler.event(Event::Null { key })))
        }
        b'n' if strict.accepts_bare_specials() && lexer::scan_keyword(input, pos, b"nan") => {
            Ok(Dispatched::Scalar(handler.event(Event::Float64 { key, value: f64::NAN })))
        }
        b'i' if strict.accepts_bare_specials() && lexer::scan_keyword(input, pos, b"inf") => {
            Ok(Dispatched::Scalar(handler.event(Event::Float64 { key, value: f64::INFINITY })))
        }
        b'-' if strict.accepts_bare_specials() && lexer::scan_keyword(input, pos, b"-inf") => {
            Ok(Dispatched::Scalar(handler.event(Event::Float64 { key, value: f64::NEG_INFINITY })))
        }
        b'-' | b'+' | b'0'..=b'9' => {
            let token = scan_number(input, pos, strict, 0)?;
            let control = match token {
                NumberToken::Int32(value) => handler.event(Event::Int32 { key, value }),
                NumberToken::Uhex32(value) => handler.event(Event::Uhex32 { key, value }),
                NumberToken::Int64(value) => handler.event(Event::Int64 { key, value }),
                NumberToken::Uhex64(value) => handler.event(Event::Uhex64 { key, value }),
                NumberToken::Float64(value) => handler.event(Event::Float64 { key, value }),
            };
            Ok(Dispatched::Scalar(control))
        }
        _ => Err(Error::parse(*pos, "unexpected byte at start of value", input)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Tag {
        Null,
        Bool(bool),
        Int(i64),
        Str,
        ArrayStart,
        ArrayFinish,
        ObjectStart,
        ObjectFinish,
    }

    fn record(input: &str) -> Vec<(String, Tag)> {
        let mut events = Vec::new();
        parse_sax(
            input.as_bytes(),
            &mut |e: Event<'_>| {
                let (key, tag) = match e {
                    Event::Null { key } => (key, Tag::Null),
                    Event::Bool { key, value } => (key, Tag::Bool(value)),
                    Event::Int32 { key, value } => (key, Tag::Int(value as i64)),
                    Event::Int64 { key, value } => (key, Tag::Int(value)),
                    Event::Uhex32 { key, value } => (key, Tag::Int(value as i64)),
                    Event::Uhex64 { key, value } => (key, Tag::Int(value as i64)),
                    Event::Float64 { key, .. } => (key, Tag::Int(-1)),
                    Event::String { key, .. } => (key, Tag::Str),
                    Event::ArrayStart { key } => (key, Tag::ArrayStart),
                    Event::ArrayFinish { key } => (key, Tag::ArrayFinish),
                    Event::ObjectStart { key } => (key, Tag::ObjectStart),
                    Event::ObjectFinish { key } => (key, Tag::ObjectFinish),
                };
                events.push((String::from_utf8_lossy(key.as_bytes()).into_owned(), tag));
                Control::Continue
            },
            &ParseOptions::default(),
        )
        .unwrap();
        events
    }

    #[test]
    fn matches_documented_event_order() {
        // parse_sax("{"x":[1,2]}", cb) calls cb in order:
        // object-start(key=""), array-start(key="x"), int(1,key=""),
        // int(2,key=""), array-finish(key="x"), object-finish(key="").
        let events = record("{\"x\":[1,2]}");
        assert_eq!(
            events,
            vec![
                ("".to_string(), Tag::ObjectStart),
                ("x".to_string(), Tag::ArrayStart),
                ("".to_string(), Tag::Int(1)),
                ("".to_string(), Tag::Int(2)),
                ("x".to_string(), Tag::ArrayFinish),
                ("".to_string(), Tag::ObjectFinish),
            ]
        );
    }

    #[test]
    fn empty_array_and_object_open_then_immediately_finish() {
        assert_eq!(record("[]"), vec![("".to_string(), Tag::ArrayStart), ("".to_string(), Tag::ArrayFinish)]);
        assert_eq!(record("{}"), vec![("".to_string(), Tag::ObjectStart), ("".to_string(), Tag::ObjectFinish)]);
    }

    #[test]
    fn stopping_mid_document_unwinds_open_containers_and_reports_callback_stop() {
        let mut seen = Vec::new();
        let err = parse_sax(
            b"{\"a\":[1,2,3]}",
            &mut |e: Event<'_>| {
                let stop_here = matches!(e, Event::Int32 { value: 2, .. });
                seen.push(match e {
                    Event::ObjectStart { .. } => "object-start",
                    Event::ArrayStart { .. } => "array-start",
                    Event::Int32 { .. } => "int",
                    Event::ArrayFinish { .. } => "array-finish",
                    Event::ObjectFinish { .. } => "object-finish",
                    _ => "other",
                });
                if stop_here {
                    Control::Stop
                } else {
                    Control::Continue
                }
            },
            &ParseOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::CallbackStop { .. }));
        assert_eq!(seen, vec!["object-start", "array-start", "int", "array-finish", "object-finish"]);
    }

    #[test]
    fn string_values_and_keys_round_trip() {
        let events = record("{\"greeting\":\"hi\"}");
        assert_eq!(events, vec![("".to_string(), Tag::ObjectStart), ("greeting".to_string(), Tag::Str), ("".to_string(), Tag::ObjectFinish)]);
    }

    #[test]
    fn owned_variant_marks_every_descriptor_as_owned() {
        let mut saw_owned = true;
        parse_sax_owned(
            b"{\"a\":1}",
            &mut |e: Event<'_>| {
                let owned = match e {
                    Event::ObjectStart { key } | Event::ObjectFinish { key } | Event::Int32 { key, .. } => key.is_owned(),
                    _ => true,
                };
                saw_owned &= owned;
                Control::Continue
            },
            &ParseOptions::default(),
        )
        .unwrap();
        assert!(saw_owned);
    }

    #[test]
    fn rejects_trailing_garbage_in_strict_mode() {
        let err = parse_sax(b"{} garbage", &mut |_: Event<'_>| Control::Continue, &ParseOptions::strict()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
