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

//! Cross-module properties that don't belong inside any single
//! module's own unit tests: parse/print round-tripping, shortest
//! round-trip `dtoa`, print idempotence, escape completeness, and
//! SAX/DOM event equivalence.

use flashjson::dom::parse_dom;
use flashjson::mem::Arena;
use flashjson::num::{atod_parts, dtoa};
use flashjson::options::ParseOptions;
use flashjson::print::print_dom_to_vec;
use flashjson::sax::{parse_sax, Control, Event, SaxHandler};
use flashjson::value::{Kind, Payload, Value};
use flashjson::PrintOptions;

const SAMPLE: &str = r#"{"name":"flash","ok":true,"tags":["a","b"],"count":3,"ratio":0.5,"nothing":null}"#;

#[test]
fn parse_then_print_then_reparse_preserves_shape() {
    let arena = Arena::default();
    let first = parse_dom(SAMPLE.as_bytes(), &arena, &ParseOptions::default()).unwrap();
    let printed = print_dom_to_vec(&first, PrintOptions::compact()).unwrap();

    let arena2 = Arena::default();
    let second = parse_dom(&printed, &arena2, &ParseOptions::default()).unwrap();

    assert_eq!(first.kind(), second.kind());
    let (a, b) = (first.as_object().unwrap(), second.as_object().unwrap());
    assert_eq!(a.len(), b.len());
    assert_eq!(
        a.get_linear(b"name").unwrap().as_str(),
        b.get_linear(b"name").unwrap().as_str()
    );
    assert_eq!(
        a.get_linear(b"tags").unwrap().as_array().unwrap().len(),
        b.get_linear(b"tags").unwrap().as_array().unwrap().len()
    );
}

#[test]
fn printing_twice_in_compact_mode_is_idempotent() {
    let arena = Arena::default();
    let value = parse_dom(SAMPLE.as_bytes(), &arena, &ParseOptions::default()).unwrap();
    let once = print_dom_to_vec(&value, PrintOptions::compact()).unwrap();

    let arena2 = Arena::default();
    let reparsed = parse_dom(&once, &arena2, &ParseOptions::default()).unwrap();
    let twice = print_dom_to_vec(&reparsed, PrintOptions::compact()).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn dtoa_output_round_trips_through_atod() {
    for value in [
        0.1,
        0.5,
        1.0,
        -2.0,
        3.14159265358979,
        1e300,
        5e-324,
        123456789.0,
        1.0 / 3.0,
    ] {
        let mut out = Vec::new();
        dtoa(value, &mut out);
        let text = std::str::from_utf8(&out).unwrap();
        let parsed: f64 = text.parse().expect("dtoa output must be a valid float literal");
        assert_eq!(parsed.to_bits(), value.to_bits(), "round-trip failed for {value} -> {text}");
    }
}

#[test]
fn dtoa_output_is_the_shortest_that_round_trips() {
    // Removing the last significant digit from the formatted mantissa
    // must change which f64 it parses back to.
    for value in [0.1, 1.5, 123.456, 2.0f64.powi(53) + 2.0] {
        let mut out = Vec::new();
        dtoa(value, &mut out);
        let text = std::str::from_utf8(&out).unwrap();

        // Find the last digit in the mantissa (skip any exponent suffix).
        let mantissa_end = text.find(['e', 'E']).unwrap_or(text.len());
        let mut truncated: Vec<u8> = text.as_bytes()[..mantissa_end].to_vec();
        let last_digit_pos = truncated.iter().rposition(u8::is_ascii_digit).unwrap();
        truncated.remove(last_digit_pos);
        truncated.extend_from_slice(text.as_bytes()[mantissa_end..].iter());

        if let Ok(shorter_text) = std::str::from_utf8(&truncated) {
            if let Ok(shorter) = shorter_text.parse::<f64>() {
                assert_ne!(
                    shorter.to_bits(),
                    value.to_bits(),
                    "a shorter digit string than {text:?} still round-trips to {value}"
                );
            }
        }
    }
}

#[test]
fn atod_parts_matches_standard_library_parsing() {
    // int_part/frac_part as ASCII digit strings, matching `scan_number`'s
    // decomposition of an already-validated numeral.
    let cases: &[(bool, &[u8], &[u8], i32, f64)] = &[
        (false, b"123", b"", 0, 123.0),
        (false, b"0", b"5", 0, 0.5),
        (true, b"2", b"", 0, -2.0),
        (false, b"1", b"", 3, 1000.0),
        (false, b"1", b"", -1, 0.1),
    ];
    for &(negative, int_part, frac_part, exp, expected) in cases {
        let got = atod_parts(negative, int_part, frac_part, exp);
        assert_eq!(got, expected);
    }
}

#[test]
fn every_byte_value_survives_an_escape_round_trip() {
    let arena = Arena::default();
    let bump = bumpalo::Bump::new();

    let all_bytes: Vec<u8> = (0u8..=255).collect();
    let mut value = Value::empty_array(&bump);
    value.add_child(Value::new(Payload::String(flashjson::StringRef::new(&all_bytes))));

    let printed = print_dom_to_vec(&value, PrintOptions::compact()).unwrap();
    let reparsed = parse_dom(&printed, &arena, &ParseOptions::default()).unwrap();

    // The original bytes are not all valid UTF-8, so compare through
    // the raw `Payload::String` bytes instead of `as_str`.
    match reparsed.as_array().unwrap()[0].payload() {
        Payload::String(s) => assert_eq!(s.as_bytes(), all_bytes.as_slice()),
        other => panic!("expected a string payload, got {other:?}"),
    }
}

#[test]
fn astral_plane_surrogate_pairs_round_trip() {
    // U+1F600 GRINNING FACE, outside the BMP, requires a UTF-16
    // surrogate pair on the wire.
    let arena = Arena::default();
    let input = br#""😀""#;
    let value = parse_dom(input, &arena, &ParseOptions::default()).unwrap();
    assert_eq!(value.as_str().unwrap(), "\u{1F600}");

    let printed = print_dom_to_vec(&value, PrintOptions::compact()).unwrap();
    let arena2 = Arena::default();
    let reparsed = parse_dom(&printed, &arena2, &ParseOptions::default()).unwrap();
    assert_eq!(reparsed.as_str().unwrap(), "\u{1F600}");
}

/// Rebuilds a tree shape from a SAX event stream, tracking only node
/// kinds and container/array lengths, for comparison against the
/// equivalent DOM parse.
struct ShapeRecorder {
    path: Vec<(Kind, usize)>,
    finished: Vec<(Kind, usize)>,
}

impl ShapeRecorder {
    fn new() -> Self {
        Self { path: Vec::new(), finished: Vec::new() }
    }

    fn leaf(&mut self, kind: Kind) {
        if let Some(top) = self.path.last_mut() {
            top.1 += 1;
        } else {
            self.finished.push((kind, 0));
        }
    }
}

impl SaxHandler for ShapeRecorder {
    fn event(&mut self, event: Event<'_>) -> Control {
        match event {
            Event::Null { .. } => self.leaf(Kind::Null),
            Event::Bool { .. } => self.leaf(Kind::Bool),
            Event::Int32 { .. } => self.leaf(Kind::Int32),
            Event::Uhex32 { .. } => self.leaf(Kind::Uhex32),
            Event::Int64 { .. } => self.leaf(Kind::Int64),
            Event::Uhex64 { .. } => self.leaf(Kind::Uhex64),
            Event::Float64 { .. } => self.leaf(Kind::Float64),
            Event::String { .. } => self.leaf(Kind::String),
            Event::ArrayStart { .. } => self.path.push((Kind::Array, 0)),
            Event::ObjectStart { .. } => self.path.push((Kind::Object, 0)),
            Event::ArrayFinish { .. } | Event::ObjectFinish { .. } => {
                let finished = self.path.pop().unwrap();
                if let Some(parent) = self.path.last_mut() {
                    parent.1 += 1;
                } else {
                    self.finished.push(finished);
                }
            }
        }
        Control::Continue
    }
}

fn count_children(value: &Value<'_>) -> usize {
    match value.payload() {
        Payload::Array(items) => items.len(),
        Payload::Object(children) => children.len(),
        _ => 0,
    }
}

#[test]
fn sax_and_dom_agree_on_document_shape() {
    let arena = Arena::default();
    let tree = parse_dom(SAMPLE.as_bytes(), &arena, &ParseOptions::default()).unwrap();

    let mut recorder = ShapeRecorder::new();
    parse_sax(SAMPLE.as_bytes(), &mut recorder, &ParseOptions::default()).unwrap();

    assert_eq!(recorder.finished.len(), 1);
    let (kind, child_count) = recorder.finished[0];
    assert_eq!(kind, tree.kind());
    assert_eq!(child_count, count_children(&tree));
}

#[test]
fn sax_callback_stop_unwinds_every_open_container() {
    struct StopAfterOne(usize);
    impl SaxHandler for StopAfterOne {
        fn event(&mut self, _event: Event<'_>) -> Control {
            self.0 += 1;
            if self.0 >= 2 {
                Control::Stop
            } else {
                Control::Continue
            }
        }
    }

    let mut handler = StopAfterOne(0);
    let err = parse_sax(br#"{"a":[1,2,3]}"#, &mut handler, &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, flashjson::Error::CallbackStop { .. }));
}
