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

//! String literal scanning, including `\uXXXX` escapes and
//! UTF-16 surrogate pair decoding to UTF-8.

use crate::error::{Error, Result};
use crate::options::Strictness;
use crate::value::StringRef;

fn hex_digit(b: u8) -> Option<u16> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u16),
        b'a'..=b'f' => Some((b - b'a' + 10) as u16),
        b'A'..=b'F' => Some((b - b'A' + 10) as u16),
        _ => None,
    }
}

fn scan_hex4(bytes: &[u8], pos: &mut usize) -> Option<u16> {
    if *pos + 4 > bytes.len() {
        return None;
    }
    let mut v: u16 = 0;
    for i in 0..4 {
        v = (v << 4) | hex_digit(bytes[*pos + i])?;
    }
    *pos += 4;
    Some(v)
}

fn encode_utf8(scalar: u32, out: &mut Vec<u8>) {
    match char::from_u32(scalar) {
        Some(c) => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        None => {
            // Can only happen for a lone, unpaired surrogate scalar
            // that slipped past validation; emit the Unicode
            // replacement character rather than panicking.
            out.extend_from_slice("\u{FFFD}".as_bytes());
        }
    }
}

/// Decodes one `\uXXXX` escape (the `\u` has already been consumed),
/// handling a following low surrogate if `high` denotes a high
/// surrogate. Returns the decoded scalar.
fn decode_unicode_escape(bytes: &[u8], pos: &mut usize, start_offset: usize) -> Result<u32> {
    let high = scan_hex4(bytes, pos)
        .ok_or_else(|| Error::lex(start_offset, "truncated \\u escape", bytes))?;

    if (0xD800..=0xDBFF).contains(&high) {
        if bytes.get(*pos) != Some(&b'\\') || bytes.get(*pos + 1) != Some(&b'u') {
            return Err(Error::lex(start_offset, "unpaired UTF-16 high surrogate", bytes));
        }
        let mut low_pos = *pos + 2;
        let low = scan_hex4(bytes, &mut low_pos)
            .ok_or_else(|| Error::lex(start_offset, "truncated \\u escape", bytes))?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(Error::lex(start_offset, "high surrogate not followed by a low surrogate", bytes));
        }
        *pos = low_pos;
        let scalar = 0x10000 + (((high as u32 & 0x3FF) << 10) | (low as u32 & 0x3FF));
        Ok(scalar)
    } else if (0xDC00..=0xDFFF).contains(&high) {
        Err(Error::lex(start_offset, "low surrogate in lead position", bytes))
    } else {
        Ok(high as u32)
    }
}

/// Core escape decoder shared by all three string modes: walks the
/// literal body starting at `pos` (just past the opening `"`),
/// appending decoded bytes to `out`, stopping at the closing `"`
/// (consumed) and returning whether any escape sequence was present.
/// `base_offset` is the absolute byte offset of `bytes[0]`, for error
/// reporting.
fn decode_body(
    bytes: &[u8],
    pos: &mut usize,
    strictness: Strictness,
    base_offset: usize,
    out: &mut Vec<u8>,
) -> Result<bool> {
    let mut had_escape = false;
    loop {
        if *pos >= bytes.len() {
            return Err(Error::lex(base_offset + *pos, "unterminated string literal", bytes));
        }
        let b = bytes[*pos];
        match b {
            b'"' => {
                *pos += 1;
                return Ok(had_escape);
            }
            b'\\' => {
                had_escape = true;
                let esc_offset = base_offset + *pos;
                *pos += 1;
                let Some(&esc) = bytes.get(*pos) else {
                    return Err(Error::lex(esc_offset, "unterminated escape sequence", bytes));
                };
                *pos += 1;
                match esc {
                    b'"' => out.push(b'"'),
                    b'\\' => out.push(b'\\'),
                    b'/' => out.push(b'/'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0C),
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'v' => out.push(0x0B),
                    b'u' => {
                        let scalar = decode_unicode_escape(bytes, pos, esc_offset)?;
                        encode_utf8(scalar, out);
                    }
                    _ => return Err(Error::lex(esc_offset, "unknown escape sequence", bytes)),
                }
            }
            _ if b < 0x20 => {
                if strictness.rejects_control_bytes_in_strings() {
                    return Err(Error::lex(
                        base_offset + *pos,
                        "control byte in string literal",
                        bytes,
                    ));
                }
                out.push(b);
                *pos += 1;
            }
            _ => {
                out.push(b);
                *pos += 1;
            }
        }
    }
}

/// Scans a string literal out of a borrowed, read-only slice (the
/// copy/zero-copy modes). `pos` starts just past the opening `"`.
/// When the literal contains no escape, the returned descriptor
/// borrows directly from `bytes` (zero-copy); otherwise `scratch` is
/// filled with the decoded bytes and the caller (typically the DOM
/// driver, which owns an arena) is responsible for copying `scratch`
/// into longer-lived storage and building the final [`StringRef`]
/// from it.
pub fn scan_string_slice<'a>(
    bytes: &'a [u8],
    pos: &mut usize,
    strictness: Strictness,
    base_offset: usize,
    scratch: &mut Vec<u8>,
) -> Result<Option<StringRef<'a>>> {
    let body_start = *pos;
    scratch.clear();
    let had_escape = decode_body(bytes, pos, strictness, base_offset, scratch)?;
    if had_escape {
        Ok(None)
    } else {
        let body_end = *pos - 1; // exclude the closing quote
        Ok(Some(StringRef::with_flag(&bytes[body_start..body_end], false)))
    }
}

/// Scans and decodes a string literal in place, overwriting the
/// source buffer. Always legal: decoded
/// output is never longer than the encoded input.
pub fn scan_string_reuse<'a>(
    bytes: &'a mut [u8],
    pos: &mut usize,
    strictness: Strictness,
    base_offset: usize,
) -> Result<StringRef<'a>> {
    let body_start = *pos;
    let mut scratch = Vec::with_capacity(16);
    decode_body(bytes, pos, strictness, base_offset, &mut scratch)?;
    let out = &mut bytes[body_start..body_start + scratch.len()];
    out.copy_from_slice(&scratch);
    Ok(StringRef::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice_result(input: &[u8]) -> (String, bool) {
        let mut pos = 1; // skip opening quote
        let mut scratch = Vec::new();
        let r = scan_string_slice(input, &mut pos, Strictness::Relaxed, 0, &mut scratch).unwrap();
        match r {
            Some(s) => (String::from_utf8(s.as_bytes().to_vec()).unwrap(), false),
            None => (String::from_utf8(scratch).unwrap(), true),
        }
    }

    #[test]
    fn escape_free_literal_is_zero_copy() {
        let (s, escaped) = slice_result(b"\"hello\"");
        assert_eq!(s, "hello");
        assert!(!escaped);
    }

    #[test]
    fn simple_escapes_decode() {
        let (s, escaped) = slice_result(b"\"a\\nb\\tc\\\"d\"");
        assert_eq!(s, "a\nb\tc\"d");
        assert!(escaped);
    }

    #[test]
    fn surrogate_pair_decodes_to_utf8() {
        let (s, _) = slice_result(b"\"\\uD83D\\uDE00\"");
        assert_eq!(s.as_bytes(), &[0xF0, 0x9F, 0x98, 0x80]);
    }

    #[test]
    fn unpaired_high_surrogate_is_a_lex_error() {
        let input = b"\"\\uD83D\"";
        let mut pos = 1;
        let mut scratch = Vec::new();
        let err = scan_string_slice(input, &mut pos, Strictness::Relaxed, 0, &mut scratch).unwrap_err();
        assert!(matches!(err, Error::Lex { .. }));
    }

    #[test]
    fn solidus_escape_decodes_to_plain_slash() {
        let (s, _) = slice_result(b"\"a\\/b\"");
        assert_eq!(s, "a/b");
    }

    #[test]
    fn control_byte_rejected_under_strict2() {
        let input = b"\"a\nb\"";
        let mut pos = 1;
        let mut scratch = Vec::new();
        let err = scan_string_slice(input, &mut pos, Strictness::Strict2, 0, &mut scratch).unwrap_err();
        assert!(matches!(err, Error::Lex { .. }));
    }

    #[test]
    fn reuse_mode_decodes_in_place_and_shrinks() {
        let mut data = *b"\"a\\nb\"...";
        let mut pos = 1;
        let s = scan_string_reuse(&mut data, &mut pos, Strictness::Relaxed, 0).unwrap();
        assert_eq!(s.as_bytes(), b"a\nb");
    }
}
