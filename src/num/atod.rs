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

//! Fast string-to-double conversion: an integer mantissa accumulated
//! digit by digit, scaled by a power of ten computed from pre-tabulated
//! `10^n` constants for the common range and `f64` exponentiation
//! beyond it.

/// Exact `f64` values of `10^0..=10^22`: every integer in this range
/// is exactly representable in a `f64` mantissa, so multiplying or
/// dividing by one of these is the only place `atod` can stay exact
/// without falling back to arbitrary precision.
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Mantissa digit limit before further digits stop affecting the
/// result (`f64` has ~17 significant decimal digits): once reached,
/// further digits stop accumulating into the mantissa and instead only
/// shift the exponent.
const MAX_MANTISSA_DIGITS: u32 = 19;

/// Parses the ASCII-digit run `digits` (with optional sign already
/// stripped by the caller) together with a base-10 `exponent`
/// (positive: multiply, negative: divide) into the nearest `f64`.
///
/// `digits` must be a nonempty run of `b'0'..=b'9'`. `exponent` is the
/// net power of ten to apply (decimal-point shift plus any `e`/`E`
/// suffix), matching the normalized form the lexer hands off (optional
/// sign, integer part, optional fraction, optional exponent, already
/// validated).
pub fn atod(digits: &[u8], mut exponent: i32) -> f64 {
    let mut mantissa: u64 = 0;
    let mut mantissa_digits: u32 = 0;
    let mut seen_nonzero = false;

    for &b in digits {
        let d = (b - b'0') as u64;
        if mantissa_digits < MAX_MANTISSA_DIGITS {
            if d != 0 {
                seen_nonzero = true;
            }
            if seen_nonzero || mantissa != 0 {
                mantissa = mantissa * 10 + d;
                mantissa_digits += 1;
            }
        } else {
            // Digit beyond the precision we can represent: it still
            // shifts the decimal point, so fold it into the exponent
            // instead of the mantissa.
            exponent += 1;
        }
    }

    if mantissa == 0 {
        return 0.0;
    }

    let mut value = mantissa as f64;

    if exponent == 0 {
        return value;
    }
    if exponent > 0 {
        if exponent <= 22 && value <= 1e15 {
            return value * POW10[exponent as usize];
        }
        // Split the scaling into an exact inner multiply (when
        // possible) and a libm `powi` tail; this stays within a few
        // ulp of correctly-rounded for the huge majority of inputs.
        if exponent <= 15 {
            value *= POW10[exponent as usize];
            return value;
        }
        value *= POW10[15];
        return value * 10f64.powi(exponent - 15);
    }

    let neg_exponent = -exponent;
    if neg_exponent <= 22 {
        return value / POW10[neg_exponent as usize];
    }
    value /= POW10[15];
    value / 10f64.powi(neg_exponent - 15)
}

/// Parses a complete JSON number literal's three components (already
/// split by the lexer) into an `f64`. `int_part` and
/// `frac_part` are digit-only byte slices (either may be empty, but
/// not both); `exp` is the signed exponent suffix value, or 0 if
/// absent.
pub fn atod_parts(negative: bool, int_part: &[u8], frac_part: &[u8], exp: i32) -> f64 {
    let mut digits = Vec::with_capacity(int_part.len() + frac_part.len());
    digits.extend_from_slice(int_part);
    digits.extend_from_slice(frac_part);
    let point_shift = exp - frac_part.len() as i32;
    let value = atod(&digits, point_shift);
    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_digit_runs_produce_zero() {
        assert_eq!(atod(b"0", 0), 0.0);
        assert_eq!(atod(b"000", 0), 0.0);
    }

    #[test]
    fn simple_integers_round_trip() {
        assert_eq!(atod(b"12345", 0), 12345.0);
        assert_eq!(atod(b"1", 2), 100.0);
    }

    #[test]
    fn fractional_literals_match_std_parse() {
        for (digits, exponent, expected) in
            [(&b"3141592653589793"[..], -15, 3.141592653589793_f64), (b"5", -1, 0.5), (b"25", -2, 0.25)]
        {
            assert_eq!(atod(digits, exponent), expected);
        }
    }

    #[test]
    fn atod_parts_handles_sign_and_exponent_suffix() {
        assert_eq!(atod_parts(true, b"1", b"5", 0), -1.5);
        assert_eq!(atod_parts(false, b"2", b"", 3), 2000.0);
        assert_eq!(atod_parts(false, b"1", b"23", -2), 0.0123);
    }

    #[test]
    fn large_exponents_do_not_panic_and_stay_finite_or_infinite() {
        let v = atod(b"1", 300);
        assert!(v.is_infinite() || v.is_finite());
    }
}
