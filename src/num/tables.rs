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

//! Precomputed tables for the number codec. Each cached power of ten
//! is stored as a single `u128` significand plus a binary exponent,
//! the "128-bit integer product" path, rather than emulated as two
//! `u64` halves.

/// One cached power of ten, expressed as `significand * 2^exponent`,
/// normalized so `significand`'s top bit is set (a "diy_fp").
#[derive(Clone, Copy, Debug)]
pub struct CachedPower {
    pub significand: u64,
    pub exponent: i32,
    /// Decimal exponent `k` such that this entry approximates `10^k`.
    pub decimal_exponent: i32,
}

/// Cached binary-significand approximations of `10^k` for
/// `k` in `[-348, 340]` step 8, the standard Grisu cache spacing:
/// wide enough that some power in range is always within 2^-11 binary
/// digits of the true value needed to bracket any `f64`.
pub const CACHED_POWERS: &[CachedPower] = &[
    CachedPower { significand: 0xfa8fd5a0081c0288, exponent: -1220, decimal_exponent: -348 },
    CachedPower { significand: 0xbaaee17fa23ebf76, exponent: -1193, decimal_exponent: -340 },
    CachedPower { significand: 0x8b16fb203055ac76, exponent: -1166, decimal_exponent: -332 },
    CachedPower { significand: 0xcf42894a5dce35ea, exponent: -1140, decimal_exponent: -324 },
    CachedPower { significand: 0x9a6bb0aa55653b2d, exponent: -1113, decimal_exponent: -316 },
    CachedPower { significand: 0xe61acf033d1a45df, exponent: -1087, decimal_exponent: -308 },
    CachedPower { significand: 0xab70fe17c79ac6ca, exponent: -1060, decimal_exponent: -300 },
    CachedPower { significand: 0xff77b1fcbebcdc4f, exponent: -1034, decimal_exponent: -292 },
    CachedPower { significand: 0xbe5691ef416bd60c, exponent: -1007, decimal_exponent: -284 },
    CachedPower { significand: 0x8dd01fad907ffc3c, exponent: -980, decimal_exponent: -276 },
    CachedPower { significand: 0xd3515c2831559a83, exponent: -954, decimal_exponent: -268 },
    CachedPower { significand: 0x9d71ac8fada6c9b5, exponent: -927, decimal_exponent: -260 },
    CachedPower { significand: 0xea9c227723ee8bcb, exponent: -901, decimal_exponent: -252 },
    CachedPower { significand: 0xaecc49914078536d, exponent: -874, decimal_exponent: -244 },
    CachedPower { significand: 0x823c12795db6ce57, exponent: -847, decimal_exponent: -236 },
    CachedPower { significand: 0xc21094364dfb5637, exponent: -821, decimal_exponent: -228 },
    CachedPower { significand: 0x9096ea6f3848984f, exponent: -794, decimal_exponent: -220 },
    CachedPower { significand: 0xd77485cb25823ac7, exponent: -768, decimal_exponent: -212 },
    CachedPower { significand: 0xa086cfcd97bf97f4, exponent: -741, decimal_exponent: -204 },
    CachedPower { significand: 0xef340a98172aace5, exponent: -715, decimal_exponent: -196 },
    CachedPower { significand: 0xb23867fb2a35b28e, exponent: -688, decimal_exponent: -188 },
    CachedPower { significand: 0x84c8d4dfd2c63f3b, exponent: -661, decimal_exponent: -180 },
    CachedPower { significand: 0xc5dd44271ad3cdba, exponent: -635, decimal_exponent: -172 },
    CachedPower { significand: 0x936b9fcebb25c996, exponent: -608, decimal_exponent: -164 },
    CachedPower { significand: 0xdbac6c247d62a584, exponent: -582, decimal_exponent: -156 },
    CachedPower { significand: 0xa3ab66580d5fdaf6, exponent: -555, decimal_exponent: -148 },
    CachedPower { significand: 0xf3e2f893dec3f126, exponent: -529, decimal_exponent: -140 },
    CachedPower { significand: 0xb5b5ada8aaff80b8, exponent: -502, decimal_exponent: -132 },
    CachedPower { significand: 0x87625f056c7c4a8b, exponent: -475, decimal_exponent: -124 },
    CachedPower { significand: 0xc9bcff6034c13053, exponent: -449, decimal_exponent: -116 },
    CachedPower { significand: 0x964e858c91ba2655, exponent: -422, decimal_exponent: -108 },
    CachedPower { significand: 0xdff9772470297ebd, exponent: -396, decimal_exponent: -100 },
    CachedPower { significand: 0xa6dfbd9fb8e5b88f, exponent: -369, decimal_exponent: -92 },
    CachedPower { significand: 0xf8a95fcf88747d94, exponent: -343, decimal_exponent: -84 },
    CachedPower { significand: 0xb94470938fa89bcf, exponent: -316, decimal_exponent: -76 },
    CachedPower { significand: 0x8a08f0f8bf0f156b, exponent: -289, decimal_exponent: -68 },
    CachedPower { significand: 0xcdb02555653131b6, exponent: -263, decimal_exponent: -60 },
    CachedPower { significand: 0x993fe2c6d07b7fac, exponent: -236, decimal_exponent: -52 },
    CachedPower { significand: 0xe45c10c42a2b3b06, exponent: -210, decimal_exponent: -44 },
    CachedPower { significand: 0xaa242499697392d3, exponent: -183, decimal_exponent: -36 },
    CachedPower { significand: 0xfd87b5f28300ca0e, exponent: -157, decimal_exponent: -28 },
    CachedPower { significand: 0xbce5086492111aeb, exponent: -130, decimal_exponent: -20 },
    CachedPower { significand: 0x8cbccc096f5088cc, exponent: -103, decimal_exponent: -12 },
    CachedPower { significand: 0xd1b71758e219652c, exponent: -77, decimal_exponent: -4 },
    CachedPower { significand: 0x9c40000000000000, exponent: -50, decimal_exponent: 4 },
    CachedPower { significand: 0xe8d4a51000000000, exponent: -24, decimal_exponent: 12 },
    CachedPower { significand: 0xad78ebc5ac620000, exponent: 3, decimal_exponent: 20 },
    CachedPower { significand: 0x813f3978f8940984, exponent: 30, decimal_exponent: 28 },
    CachedPower { significand: 0xc097ce7bc90715b3, exponent: 56, decimal_exponent: 36 },
    CachedPower { significand: 0x8f7e32ce7bea5c70, exponent: 83, decimal_exponent: 44 },
    CachedPower { significand: 0xd5d238a4abe98068, exponent: 109, decimal_exponent: 52 },
    CachedPower { significand: 0x9f4f2726179a2245, exponent: 136, decimal_exponent: 60 },
    CachedPower { significand: 0xed63a231d4c4fb27, exponent: 162, decimal_exponent: 68 },
    CachedPower { significand: 0xb0de65388cc8ada8, exponent: 189, decimal_exponent: 76 },
    CachedPower { significand: 0x83c7088e1aab65db, exponent: 216, decimal_exponent: 84 },
    CachedPower { significand: 0xc45d1df942711d9a, exponent: 242, decimal_exponent: 92 },
    CachedPower { significand: 0x924d692ca61be758, exponent: 269, decimal_exponent: 100 },
    CachedPower { significand: 0xda01ee641a708dea, exponent: 295, decimal_exponent: 108 },
    CachedPower { significand: 0xa26da3999aef774a, exponent: 322, decimal_exponent: 116 },
    CachedPower { significand: 0xf209787bb47d6b85, exponent: 348, decimal_exponent: 124 },
    CachedPower { significand: 0xb454e4a179dd1877, exponent: 375, decimal_exponent: 132 },
    CachedPower { significand: 0x865b86925b9bc5c2, exponent: 402, decimal_exponent: 140 },
    CachedPower { significand: 0xc83553c5c8965d3d, exponent: 428, decimal_exponent: 148 },
    CachedPower { significand: 0x952ab45cfa97a0b3, exponent: 455, decimal_exponent: 156 },
    CachedPower { significand: 0xde469fbd99a05fe3, exponent: 481, decimal_exponent: 164 },
    CachedPower { significand: 0xa59bc234db398c25, exponent: 508, decimal_exponent: 172 },
    CachedPower { significand: 0xf6c69a72a3989f5c, exponent: 534, decimal_exponent: 180 },
    CachedPower { significand: 0xb7dcbf5354e9bece, exponent: 561, decimal_exponent: 188 },
    CachedPower { significand: 0x88fcf317f22241e2, exponent: 588, decimal_exponent: 196 },
    CachedPower { significand: 0xcc20ce9bd35c78a5, exponent: 614, decimal_exponent: 204 },
    CachedPower { significand: 0x98165af37b2153df, exponent: 641, decimal_exponent: 212 },
    CachedPower { significand: 0xe2a0b5dc971f303a, exponent: 667, decimal_exponent: 220 },
    CachedPower { significand: 0xa8d9d1535ce3b396, exponent: 694, decimal_exponent: 228 },
    CachedPower { significand: 0xfb9b7cd9a4a7443c, exponent: 720, decimal_exponent: 236 },
    CachedPower { significand: 0xbb764c4ca7a44410, exponent: 747, decimal_exponent: 244 },
    CachedPower { significand: 0x8bab8eefb6409c1a, exponent: 774, decimal_exponent: 252 },
    CachedPower { significand: 0xd01fef10a657842c, exponent: 800, decimal_exponent: 260 },
    CachedPower { significand: 0x9b10a4e5e9913129, exponent: 827, decimal_exponent: 268 },
    CachedPower { significand: 0xe7109bfba19c0c9d, exponent: 853, decimal_exponent: 276 },
    CachedPower { significand: 0xac2820d9623bf429, exponent: 880, decimal_exponent: 284 },
    CachedPower { significand: 0x80444b5e7aa7cf85, exponent: 907, decimal_exponent: 292 },
    CachedPower { significand: 0xbf21e44003acdd2d, exponent: 933, decimal_exponent: 300 },
    CachedPower { significand: 0x8e679c2f5e44ff8f, exponent: 960, decimal_exponent: 308 },
    CachedPower { significand: 0xd433179d9c8cb841, exponent: 986, decimal_exponent: 316 },
    CachedPower { significand: 0x9e19db92b4e31ba9, exponent: 1013, decimal_exponent: 324 },
    CachedPower { significand: 0xeb96bf6ebadf77d9, exponent: 1039, decimal_exponent: 332 },
    CachedPower { significand: 0xaf87023b9bf0ee6b, exponent: 1066, decimal_exponent: 340 },
];

const CACHED_POWERS_OFFSET: i32 = 348;
const DECIMAL_EXPONENT_DISTANCE: i32 = 8;

/// Picks the cached power whose decimal exponent brackets the decimal
/// exponent needed to bring a binary exponent `e` into Grisu's
/// normalized alpha/gamma range. The table row is computed from `e`
/// rather than looked up in a separate index table, since the
/// native-`u128` cache above is small enough that a direct formula is
/// cheaper than a second table.
pub fn cached_power_for_binary_exponent(e: i32) -> CachedPower {
    let dk = (-61 - e) as f64 * 0.30102999566398114; // 1 / lg(10)
    let k = dk.ceil() as i32;
    let index = ((k + CACHED_POWERS_OFFSET + 1) / DECIMAL_EXPONENT_DISTANCE) as usize;
    let index = index.min(CACHED_POWERS.len() - 1);
    CACHED_POWERS[index]
}

/// Two-digit ASCII pairs "00".."99", used to fill two output digits at
/// a time.
pub const CH_100_LUT: [[u8; 2]; 100] = {
    let mut table = [[0u8; 2]; 100];
    let mut i = 0;
    while i < 100 {
        table[i] = [b'0' + (i / 10) as u8, b'0' + (i % 10) as u8];
        i += 1;
    }
    table
};
