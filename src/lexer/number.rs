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

//! Number scanning: classifies the scanned literal into its narrowest
//! kind directly, via a combined scan-and-classify pass, rather than
//! always widening to `f64` and narrowing afterward.

use crate::error::{Error, Result};
use crate::num::atod_parts;
use crate::options::Strictness;

/// The narrowest kind a scanned number literal resolved to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumberToken {
    Int32(i32),
    Uhex32(u32),
    Int64(i64),
    Uhex64(u64),
    Float64(f64),
}

fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

fn hex_value(b: u8) -> Option<u64> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u64),
        b'a'..=b'f' => Some((b - b'a' + 10) as u64),
        b'A'..=b'F' => Some((b - b'A' + 10) as u64),
        _ => None,
    }
}

/// Scans a JSON number literal at `pos`, classifying it into its
/// narrowest representable kind. `base_offset` is the absolute offset of
/// `bytes[0]`, for error reporting.
pub fn scan_number(
    bytes: &[u8],
    pos: &mut usize,
    strictness: Strictness,
    base_offset: usize,
) -> Result<NumberToken> {
    let start = *pos;
    let negative = bytes.get(*pos) == Some(&b'-');
    if negative || bytes.get(*pos) == Some(&b'+') {
        *pos += 1;
    }

    // Hex literal: `0x`/`0X` prefix, relaxed mode only.
    if bytes[*pos..].len() >= 2 && bytes[*pos] == b'0' && (bytes[*pos + 1] | 0x20) == b'x' {
        if strictness.rejects_hex_integers() {
            return Err(Error::lex(base_offset + start, "hex integer literals are not permitted", bytes));
        }
        *pos += 2;
        let digits_start = *pos;
        let mut value: u64 = 0;
        let mut ndigits = 0u32;
        while let Some(&b) = bytes.get(*pos) {
            let Some(d) = hex_value(b) else { break };
            if ndigits == 16 {
                return Err(Error::lex(base_offset + start, "hex literal exceeds 64 bits", bytes));
            }
            value = (value << 4) | d;
            ndigits += 1;
            *pos += 1;
        }
        if ndigits == 0 {
            return Err(Error::lex(base_offset + digits_start, "empty hex literal", bytes));
        }
        return Ok(if value <= u32::MAX as u64 {
            NumberToken::Uhex32(value as u32)
        } else {
            NumberToken::Uhex64(value)
        });
    }

    // Decimal: leading-zero check (strict2), integer part, optional
    // fraction, optional exponent.
    let int_start = *pos;
    if bytes.get(*pos) == Some(&b'0') {
        *pos += 1;
        if strictness.rejects_leading_zero() && bytes.get(*pos).is_some_and(|&b| is_digit(b)) {
            return Err(Error::lex(base_offset + int_start, "leading zero in decimal literal", bytes));
        }
    }
    while bytes.get(*pos).is_some_and(|&b| is_digit(b)) {
        *pos += 1;
    }
    let int_end = *pos;
    if int_end == int_start {
        return Err(Error::lex(base_offset + start, "invalid number literal", bytes));
    }

    let mut has_fraction = false;
    let frac_start;
    let frac_end;
    if bytes.get(*pos) == Some(&b'.') {
        has_fraction = true;
        *pos += 1;
        frac_start = *pos;
        while bytes.get(*pos).is_some_and(|&b| is_digit(b)) {
            *pos += 1;
        }
        frac_end = *pos;
        if frac_end == frac_start {
            return Err(Error::lex(base_offset + start, "missing digits after decimal point", bytes));
        }
    } else {
        frac_start = *pos;
        frac_end = *pos;
    }

    let mut exponent: i32 = 0;
    let mut has_exponent = false;
    if matches!(bytes.get(*pos), Some(&b'e') | Some(&b'E')) {
        has_exponent = true;
        *pos += 1;
        let exp_negative = bytes.get(*pos) == Some(&b'-');
        if exp_negative || bytes.get(*pos) == Some(&b'+') {
            *pos += 1;
        }
        let exp_digits_start = *pos;
        let mut exp_value: i64 = 0;
        while bytes.get(*pos).is_some_and(|&b| is_digit(b)) {
            exp_value = (exp_value * 10 + (bytes[*pos] - b'0') as i64).min(1_000_000);
            *pos += 1;
        }
        if *pos == exp_digits_start {
            return Err(Error::lex(base_offset + start, "missing digits in exponent", bytes));
        }
        exponent = if exp_negative { -exp_value as i32 } else { exp_value as i32 };
    }

    if !has_fraction && !has_exponent {
        // Pure integer literal: try the fast 64-bit-accumulator path.
        let digits = &bytes[int_start..int_end];
        if digits.len() <= 19 {
            if let Some(magnitude) = parse_u64_digits(digits) {
                return Ok(classify_integer(negative, magnitude));
            }
        }
        let value = atod_parts(negative, digits, b"", 0);
        return Ok(NumberToken::Float64(value));
    }

    let value = atod_parts(negative, &bytes[int_start..int_end], &bytes[frac_start..frac_end], exponent);
    Ok(NumberToken::Float64(value))
}

fn parse_u64_digits(digits: &[u8]) -> Option<u64> {
    let mut value: u64 = 0;
    for &b in digits {
        value = value.checked_mul(10)?.checked_add((b - b'0') as u64)?;
    }
    Some(value)
}

fn classify_integer(negative: bool, magnitude: u64) -> NumberToken {
    if negative {
        if magnitude <= i32::MAX as u64 + 1 {
            NumberToken::Int32(-(magnitude as i64) as i32)
        } else if magnitude <= i64::MAX as u64 + 1 {
            NumberToken::Int64(-(magnitude as i64))
        } else {
            NumberToken::Float64(-(magnitude as f64))
        }
    } else if magnitude <= i32::MAX as u64 {
        NumberToken::Int32(magnitude as i32)
    } else {
        NumberToken::Int64(magnitude as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str, strictness: Strictness) -> Result<NumberToken> {
        let bytes = input.as_bytes();
        let mut pos = 0;
        scan_number(bytes, &mut pos, strictness, 0)
    }

    #[test]
    fn small_integers_classify_as_int32() {
        assert_eq!(scan("0", Strictness::Relaxed).unwrap(), NumberToken::Int32(0));
        assert_eq!(scan("-2", Strictness::Relaxed).unwrap(), NumberToken::Int32(-2));
        assert_eq!(scan("2147483647", Strictness::Relaxed).unwrap(), NumberToken::Int32(i32::MAX));
    }

    #[test]
    fn integers_beyond_i32_widen_to_int64() {
        assert_eq!(scan("2147483648", Strictness::Relaxed).unwrap(), NumberToken::Int64(2147483648));
    }

    #[test]
    fn hex_literal_classifies_by_width() {
        assert_eq!(scan("0xff", Strictness::Relaxed).unwrap(), NumberToken::Uhex32(0xff));
        assert_eq!(
            scan("0xffffffffff", Strictness::Relaxed).unwrap(),
            NumberToken::Uhex64(0xffffffffff)
        );
    }

    #[test]
    fn hex_literal_rejected_under_strict2() {
        assert!(scan("0xff", Strictness::Strict2).is_err());
    }

    #[test]
    fn leading_zero_rejected_under_strict2_only() {
        assert!(scan("0", Strictness::Strict2).is_ok());
        assert!(scan("01", Strictness::Strict2).is_err());
        assert!(scan("01", Strictness::Relaxed).is_ok());
    }

    #[test]
    fn fraction_and_exponent_produce_float64() {
        match scan("3.14", Strictness::Relaxed).unwrap() {
            NumberToken::Float64(v) => assert!((v - 3.14).abs() < 1e-12),
            other => panic!("expected Float64, got {other:?}"),
        }
        match scan("1e3", Strictness::Relaxed).unwrap() {
            NumberToken::Float64(v) => assert_eq!(v, 1000.0),
            other => panic!("expected Float64, got {other:?}"),
        }
    }
}
