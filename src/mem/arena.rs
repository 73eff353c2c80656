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

//! Segregated bump allocators for DOM nodes, object keys, and string
//! payloads.
//!
//! Each of the three regions is its own [`bumpalo::Bump`], so that a
//! tight loop allocating many small strings does not fragment the
//! node region and vice versa. `bumpalo` already implements the
//! "bump the cursor, allocate a fresh block when the current one is
//! full" policy this module needs; `Region` is a thin, named wrapper
//! that adds the `used_bytes` diagnostic and the adaptive default
//! block size.

use crate::options::DEFAULT_BLOCK_SIZE;
use bumpalo::Bump;

/// One bump-allocated region (nodes, keys, or strings).
///
/// `refresh` and `free_all` are `bumpalo::Bump::reset`/replacement
/// respectively; see the [`Arena`] doc comment for why `reset` is an
/// acceptable stand-in for the "keep only the first block" contract.
pub struct Region {
    bump: Bump,
    block_size: usize,
}

impl Region {
    fn new(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self { bump: Bump::with_capacity(block_size), block_size }
    }

    /// Allocates `len` uninitialized bytes with the given alignment
    /// and returns a mutable slice into the arena.
    ///
    /// The returned slice is valid for as long as this region is not
    /// reset or dropped (the arena, not the allocation, owns the
    /// memory — a value allocated in an arena may not be
    /// freed individually).
    pub fn alloc_bytes(&self, len: usize) -> &mut [u8] {
        self.bump.alloc_slice_fill_copy(len, 0u8)
    }

    /// Allocates space for, and moves, a single `T` into the arena.
    pub fn alloc<T>(&self, value: T) -> &mut T {
        self.bump.alloc(value)
    }

    /// Copies `bytes` into a freshly allocated region and returns the
    /// new, arena-owned slice.
    pub fn alloc_copy(&self, bytes: &[u8]) -> &mut [u8] {
        self.bump.alloc_slice_copy(bytes)
    }

    /// The underlying `bumpalo::Bump`, for callers (the DOM driver)
    /// that need to hand it to a `bumpalo`-aware collection such as
    /// `bumpalo::collections::Vec`.
    pub fn bump(&self) -> &Bump {
        &self.bump
    }

    /// Total bytes currently allocated across every block in this
    /// region. Diagnostic only; not exact
    /// "live" usage since bump regions never shrink mid-block.
    pub fn used_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Releases every block. Any references previously handed out by
    /// `alloc*` on this region become dangling from the caller's
    /// perspective and must not be used afterward — this is enforced
    /// by Rust's borrow checker only when `free_all` takes `&mut
    /// self`, which is why [`Arena::free_all`] consumes `self`.
    fn free_all(&mut self) {
        self.bump = Bump::with_capacity(self.block_size);
    }

    /// Releases every block except the most recently allocated one,
    /// and resets its cursor to the start, so the next parse of a
    /// similarly sized document reuses the same backing memory
    /// instead of requesting fresh pages from the allocator.
    fn refresh(&mut self) {
        self.bump.reset();
    }
}

/// The three segregated arenas used by the DOM driver: `nodes`,
/// `keys`, and `strings`.
///
/// An `Arena` is intended to be created once and `refresh`ed between
/// parses of the same parser handle, rather than recreated, so that
/// its first block (whose capacity adapts to the input size via
/// [`crate::options::ParseOptions::resolve_block_size`]) is reused.
pub struct Arena {
    pub(crate) nodes: Region,
    pub(crate) keys: Region,
    pub(crate) strings: Region,
}

impl Arena {
    /// Creates a new arena whose three regions each start with a
    /// block of `block_size` bytes (or [`DEFAULT_BLOCK_SIZE`] if `0`).
    pub fn with_block_size(block_size: usize) -> Self {
        let block_size = if block_size == 0 { DEFAULT_BLOCK_SIZE } else { block_size };
        log::trace!("arena: allocating initial blocks of {block_size} bytes");
        Self {
            nodes: Region::new(block_size),
            keys: Region::new(block_size),
            strings: Region::new(block_size),
        }
    }

    /// Sum of `used_bytes` across all three regions.
    pub fn used_bytes(&self) -> usize {
        self.nodes.used_bytes() + self.keys.used_bytes() + self.strings.used_bytes()
    }

    /// Releases every block in every region. After this call,
    /// `used_bytes() == 0`.
    pub fn free_all(&mut self) {
        self.nodes.free_all();
        self.keys.free_all();
        self.strings.free_all();
    }

    /// Resets every region, retaining (but emptying) its most recent
    /// block, so the next parse reuses the same memory.
    pub fn refresh(&mut self) {
        self.nodes.refresh();
        self.keys.refresh();
        self.strings.refresh();
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_bytes_is_writable_and_sized() {
        let region = Region::new(64);
        let slice = region.alloc_bytes(10);
        assert_eq!(slice.len(), 10);
        slice.copy_from_slice(b"0123456789");
        assert_eq!(&slice[..], b"0123456789");
    }

    #[test]
    fn free_all_zeroes_used_bytes() {
        let mut arena = Arena::with_block_size(64);
        arena.nodes.alloc_bytes(1000);
        assert!(arena.used_bytes() > 0);
        arena.free_all();
        assert_eq!(arena.used_bytes(), 0);
    }

    #[test]
    fn refresh_keeps_a_reusable_block() {
        let mut arena = Arena::with_block_size(4096);
        arena.strings.alloc_bytes(10);
        arena.refresh();
        // The retained block can satisfy a similarly sized allocation
        // without growing.
        let slice = arena.strings.alloc_bytes(10);
        assert_eq!(slice.len(), 10);
    }

    #[test]
    fn block_size_zero_uses_default() {
        let arena = Arena::with_block_size(0);
        assert_eq!(arena.nodes.block_size, DEFAULT_BLOCK_SIZE);
    }
}
