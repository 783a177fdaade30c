//! Text buffer for single-line entries.
//!
//! All offsets are byte offsets into UTF-8 data. Callers clamp offsets before
//! calling the edit primitives; an out-of-range offset is a programming error
//! and panics.

use std::ops::Range;

/// Mutable text storage backing one entry.
///
/// Capacity grows geometrically (it is a `String`) and is never released on
/// delete, so a long edit session does not thrash the allocator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Create a TextBuffer from a string slice
    pub fn from_text(s: &str) -> Self {
        Self {
            text: s.to_string(),
        }
    }

    /// Current contents
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Owned copy of the contents
    pub fn get_text(&self) -> String {
        self.text.clone()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Allocated capacity in bytes
    pub fn capacity(&self) -> usize {
        self.text.capacity()
    }

    /// Borrow a byte range of the contents
    pub fn slice(&self, range: Range<usize>) -> &str {
        self.check_range(range.start, range.end);
        &self.text[range]
    }

    /// Insert `s` at byte `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset > len()` or `offset` splits a code point.
    pub fn insert_at(&mut self, offset: usize, s: &str) {
        self.check_range(offset, offset);
        self.text.insert_str(offset, s);
    }

    /// Remove bytes `a..b` and return them.
    ///
    /// # Panics
    ///
    /// Panics unless `a <= b <= len()` and both ends are code point boundaries.
    pub fn delete_range(&mut self, a: usize, b: usize) -> String {
        self.check_range(a, b);
        self.text.drain(a..b).collect()
    }

    /// Replace everything, keeping the allocation
    pub fn set_text(&mut self, s: &str) {
        self.text.clear();
        self.text.push_str(s);
    }

    /// Clamp an offset into `0..=len()`
    pub fn clamp(&self, offset: usize) -> usize {
        offset.min(self.text.len())
    }

    /// Clamp, then move left onto the nearest code point boundary
    pub fn floor_boundary(&self, offset: usize) -> usize {
        let mut offset = self.clamp(offset);
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// Offset of the code point boundary before `offset` (0 at the start)
    pub fn prev_boundary(&self, offset: usize) -> usize {
        let offset = self.clamp(offset);
        self.text[..offset]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Offset of the code point boundary after `offset` (len at the end)
    pub fn next_boundary(&self, offset: usize) -> usize {
        let offset = self.clamp(offset);
        self.text[offset..]
            .chars()
            .next()
            .map(|ch| offset + ch.len_utf8())
            .unwrap_or(offset)
    }

    fn check_range(&self, a: usize, b: usize) {
        assert!(
            a <= b && b <= self.text.len(),
            "buffer range {}..{} out of bounds (len {})",
            a,
            b,
            self.text.len()
        );
        assert!(
            self.text.is_char_boundary(a) && self.text.is_char_boundary(b),
            "buffer range {}..{} splits a code point",
            a,
            b
        );
    }
}
