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

//! String descriptors.

/// A bounded byte string together with the two flags the printer and
/// object index need: whether it requires escaping on output, and
/// (streaming contexts only) whether it owns its backing storage.
///
/// Bounded to 2^24 - 1 bytes. The flags are kept as ordinary struct
/// fields rather than packed into the length (no ABI reason to here),
/// but the same bound is enforced so an oversized literal is rejected
/// rather than silently truncated.
#[derive(Clone, Copy, Eq, Debug)]
pub struct StringRef<'a> {
    bytes: &'a [u8],
    needs_escape: bool,
    owned: bool,
}

/// Longest byte string a [`StringRef`] can represent.
pub const MAX_STRING_LEN: usize = (1 << 24) - 1;

impl<'a> StringRef<'a> {
    /// Borrowed empty string, used for array-element keys and roots.
    pub const EMPTY: StringRef<'static> = StringRef { bytes: b"", needs_escape: false, owned: false };

    /// Builds a descriptor over `bytes`, computing the "needs escape"
    /// flag by scanning for any byte that requires a JSON escape:
    /// `"`, `\`, any byte < 0x20, or `\b \f \n \r
    /// \t \v`.
    ///
    /// # Panics
    /// Panics if `bytes.len() > MAX_STRING_LEN`, mirroring the C
    /// source's hard bound on string length.
    pub fn new(bytes: &'a [u8]) -> Self {
        assert!(bytes.len() <= MAX_STRING_LEN, "string literal exceeds 2^24-1 bytes");
        let needs_escape = bytes.iter().any(|&b| needs_escape(b));
        Self { bytes, needs_escape, owned: false }
    }

    /// As [`Self::new`], but marks the descriptor as owning its
    /// backing storage (set when a file-backed SAX parse had to copy
    /// bytes out of a transient read-buffer window).
    pub fn new_owned(bytes: &'a [u8]) -> Self {
        let mut s = Self::new(bytes);
        s.owned = true;
        s
    }

    /// Builds a descriptor without rescanning for escapes, when the
    /// caller (typically the lexer, which already knows the answer
    /// from its escape scan) has already determined the flag.
    pub fn with_flag(bytes: &'a [u8], needs_escape: bool) -> Self {
        assert!(bytes.len() <= MAX_STRING_LEN, "string literal exceeds 2^24-1 bytes");
        Self { bytes, needs_escape, owned: false }
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `true` if the bytes contain a character that must be escaped
    /// in JSON output.
    #[inline]
    pub fn needs_escape(&self) -> bool {
        self.needs_escape
    }

    /// `true` if this descriptor owns its backing storage (only
    /// meaningful for SAX callbacks over file-backed sources).
    #[inline]
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Best-effort UTF-8 view; JSON string literals are not
    /// guaranteed valid UTF-8 when non-UTF-8 bytes pass through
    /// unvalidated, so this returns
    /// `None` rather than panicking or assuming validity.
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }
}

impl PartialEq for StringRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl std::hash::Hash for StringRef<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

/// `true` iff `b` requires a JSON escape.
#[inline]
pub const fn needs_escape(b: u8) -> bool {
    matches!(b, b'"' | b'\\') || b < 0x20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_needs_no_escape() {
        let s = StringRef::new(b"hello world");
        assert!(!s.needs_escape());
    }

    #[test]
    fn quote_and_backslash_need_escape() {
        assert!(StringRef::new(b"a\"b").needs_escape());
        assert!(StringRef::new(b"a\\b").needs_escape());
    }

    #[test]
    fn control_bytes_need_escape() {
        assert!(StringRef::new(b"a\nb").needs_escape());
        assert!(StringRef::new(b"a\tb").needs_escape());
        assert!(StringRef::new(&[b'a', 0x01, b'b']).needs_escape());
    }

    #[test]
    fn solidus_does_not_need_escape() {
        // '/' is explicitly NOT escaped on output.
        assert!(!StringRef::new(b"a/b").needs_escape());
    }

    #[test]
    fn empty_constant_is_empty() {
        assert!(StringRef::EMPTY.is_empty());
        assert!(!StringRef::EMPTY.needs_escape());
    }
}
