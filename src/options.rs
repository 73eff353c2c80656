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

//! Parse and print configuration.

/// RFC 8259 strictness level.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Strictness {
    /// Accepts `0x` hex integers, control bytes in strings, empty
    /// keys, a non-object/non-array root, and bare `nan`/`inf`/`-inf`
    /// literals (an extension for round-tripping `double` special
    /// values that the number codec itself can produce).
    Relaxed,

    /// Forbids empty keys and trailing garbage after the root value.
    /// Still a superset of RFC 8259 (hex integers remain accepted).
    Strict1,

    /// Forbids hex integers, leading zeros on decimal integers, and
    /// sub-space bytes inside string literals, in addition to
    /// everything `Strict1` forbids. Full RFC 8259 compliance.
    Strict2,
}

impl Strictness {
    /// `true` for any level at or above `Strict1`.
    #[inline]
    pub const fn rejects_empty_keys(self) -> bool {
        !matches!(self, Strictness::Relaxed)
    }

    /// `true` for any level at or above `Strict1`.
    #[inline]
    pub const fn rejects_trailing_garbage(self) -> bool {
        !matches!(self, Strictness::Relaxed)
    }

    /// Trailing commas are rejected at every strict level; only
    /// `Relaxed` would accept them, and this crate does not (the
    /// source's own trailing-comma handling was inconsistent across
    /// strict levels; this crate resolves that by rejecting unconditionally).
    #[inline]
    pub const fn rejects_trailing_comma(self) -> bool {
        true
    }

    #[inline]
    pub const fn rejects_hex_integers(self) -> bool {
        matches!(self, Strictness::Strict2)
    }

    #[inline]
    pub const fn rejects_leading_zero(self) -> bool {
        matches!(self, Strictness::Strict2)
    }

    #[inline]
    pub const fn rejects_control_bytes_in_strings(self) -> bool {
        matches!(self, Strictness::Strict2)
    }

    #[inline]
    pub const fn accepts_bare_specials(self) -> bool {
        matches!(self, Strictness::Relaxed)
    }
}

impl Default for Strictness {
    #[inline]
    fn default() -> Self {
        Strictness::Relaxed
    }
}

/// Default arena block size in bytes, used when a parse gives no
/// better estimate of input size.
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

/// Default file-source read-buffer growth increment in bytes.
pub const DEFAULT_READ_SIZE: usize = 8192;

/// Options controlling a single [`crate::dom::parse_dom`] or
/// [`crate::sax::parse_sax`] call.
///
/// The arena itself is not part of this struct: following the
/// borrowed-allocator convention of passing a `Bump`-backed arena by
/// reference into the parser constructor,
/// [`crate::dom::parse_dom`] takes its arena
/// as an explicit `&Arena` parameter rather than owning or optionally
/// owning one — callers who want the "library manages the arena"
/// behavior just construct one with `Arena::with_block_size(options
/// .resolve_block_size())` and pass it in, which is equivalent but
/// keeps node lifetimes tied to a value the caller can see.
#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    /// Strictness level applied to this parse.
    pub strictness: Strictness,

    /// Initial arena block size. `None` lets the driver pick
    /// `max(input_len / 8, DEFAULT_BLOCK_SIZE)`.
    pub mem_block_size: Option<usize>,

    /// Read-buffer growth increment for file-backed sources.
    pub file_read_size: Option<usize>,

    /// Total input length, when known in advance (e.g. from
    /// `fstat`). Used only to size the initial arena block; has no
    /// effect for in-memory sources, which already know their length.
    pub input_length: Option<usize>,

    /// Records the caller's intent to use [`crate::dom::parse_dom_reuse`]
    /// instead of [`crate::dom::parse_dom`] ("reuse mode"):
    /// string literals that contain an escape are decoded by
    /// overwriting their own bytes in the input buffer instead of
    /// being copied into the string arena. Escape-free literals are
    /// already zero-copy either way, so this only changes behavior for
    /// escaped strings. The DOM driver itself does not read this field
    /// — which entry point was called is what actually selects the
    /// mode — but callers that plumb one `ParseOptions` through to a
    /// generic dispatch point can use it to decide which to call.
    pub reuse_in_place: bool,
}

impl ParseOptions {
    /// Options with `Strict1` strictness and otherwise default tuning.
    pub fn strict() -> Self {
        Self { strictness: Strictness::Strict1, ..Default::default() }
    }

    /// Sets the strictness level (chained-setter style).
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Sets the initial arena block size.
    pub fn with_mem_block_size(mut self, size: usize) -> Self {
        self.mem_block_size = Some(size);
        self
    }

    /// Enables in-place string decoding.
    pub fn with_reuse_in_place(mut self, reuse: bool) -> Self {
        self.reuse_in_place = reuse;
        self
    }

    /// Resolves the effective initial block size for this parse,
    /// applying the `max(input_size / 8, floor)` heuristic.
    pub fn resolve_block_size(&self) -> usize {
        let floor = self.mem_block_size.unwrap_or(DEFAULT_BLOCK_SIZE);
        match self.input_length {
            Some(len) => (len / 8).max(floor),
            None => floor,
        }
    }
}

/// Options controlling a single [`crate::print::print_dom`] or
/// [`crate::print::print_sax`] call.
#[derive(Clone, Debug)]
pub struct PrintOptions {
    /// `true` selects one-member-per-line, tab-indented output;
    /// `false` selects compact output with no incidental whitespace.
    pub formatted: bool,

    /// Estimated node count, used to size the initial output buffer.
    /// `0` means "unknown"; the printer falls back to a conservative
    /// default and grows as needed.
    pub item_total_hint: usize,

    /// Linear buffer-growth increment, used once doubling would
    /// overshoot significantly.
    pub buffer_plus_size: usize,

    /// Bytes reserved per item when sizing the initial buffer.
    pub per_item_size: usize,

    /// When present, output is written to this file path (with
    /// write-through buffering) instead of an in-memory buffer.
    pub path: Option<String>,

    /// Emit sub-space control bytes as `\u00XX` (`true`, RFC 8259
    /// compliant) rather than as raw bytes (`false`, an extension).
    pub escape_control_bytes: bool,

    /// When present, printing takes ownership of this existing
    /// allocation and appends to it instead of starting a fresh
    /// buffer sized from `item_total_hint`.
    pub reuse_buffer: Option<Vec<u8>>,
}

impl PrintOptions {
    /// Default per-item byte estimate for formatted output.
    pub const DEFAULT_PER_ITEM_FORMATTED: usize = 32;
    /// Default per-item byte estimate for compact output.
    pub const DEFAULT_PER_ITEM_COMPACT: usize = 24;
    /// Default linear buffer-growth increment.
    pub const DEFAULT_BUFFER_PLUS_SIZE: usize = 1024;

    /// Compact-mode printing to an in-memory buffer.
    pub fn compact() -> Self {
        Self {
            formatted: false,
            item_total_hint: 0,
            buffer_plus_size: Self::DEFAULT_BUFFER_PLUS_SIZE,
            per_item_size: Self::DEFAULT_PER_ITEM_COMPACT,
            path: None,
            escape_control_bytes: true,
            reuse_buffer: None,
        }
    }

    /// Formatted (pretty-printed) mode printing to an in-memory buffer.
    pub fn formatted() -> Self {
        Self {
            formatted: true,
            per_item_size: Self::DEFAULT_PER_ITEM_FORMATTED,
            ..Self::compact()
        }
    }

    /// Sets the node-count hint used to size the initial buffer.
    pub fn with_item_total_hint(mut self, hint: usize) -> Self {
        self.item_total_hint = hint;
        self
    }

    /// Routes output to a file path instead of an in-memory buffer.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Takes ownership of `buffer`, appending printed output to its
    /// existing contents rather than allocating fresh.
    pub fn with_reuse_buffer(mut self, buffer: Vec<u8>) -> Self {
        self.reuse_buffer = Some(buffer);
        self
    }

    /// Computes the initial buffer capacity per the sizing heuristic
    /// described above.
    pub fn initial_capacity(&self) -> usize {
        self.item_total_hint.max(1) * self.per_item_size
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self::compact()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strictness_gates_match_spec_table() {
        assert!(!Strictness::Relaxed.rejects_empty_keys());
        assert!(Strictness::Strict1.rejects_empty_keys());
        assert!(Strictness::Strict1.rejects_trailing_garbage());
        assert!(!Strictness::Strict1.rejects_hex_integers());
        assert!(Strictness::Strict2.rejects_hex_integers());
        assert!(Strictness::Strict2.rejects_leading_zero());
        assert!(Strictness::Strict2.rejects_control_bytes_in_strings());

        // Trailing commas are rejected at every level per the resolved
        // open question, including Relaxed.
        assert!(Strictness::Relaxed.rejects_trailing_comma());
    }

    #[test]
    fn resolve_block_size_uses_input_len_over_8_or_floor() {
        let opts = ParseOptions { input_length: Some(100_000), ..Default::default() };
        assert_eq!(opts.resolve_block_size(), 100_000 / 8);

        let opts = ParseOptions { input_length: Some(10), ..Default::default() };
        assert_eq!(opts.resolve_block_size(), DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn print_options_initial_capacity() {
        let opts = PrintOptions::formatted().with_item_total_hint(10);
        assert_eq!(opts.initial_capacity(), 10 * PrintOptions::DEFAULT_PER_ITEM_FORMATTED);
    }
}
