//! Selection type for text entries.

use std::ops::Range;

/// A text selection with anchor (start point) and active end (cursor side).
///
/// Offsets are bytes. Order is not normalized: the anchor may be greater than
/// the active end after a leftward drag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Where the selection started (fixed point)
    pub anchor: usize,
    /// Where the cursor is (moving point)
    pub active: usize,
}

impl Selection {
    pub fn new(anchor: usize, active: usize) -> Self {
        Self { anchor, active }
    }

    /// Create a collapsed selection (cursor with no selection)
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            active: offset,
        }
    }

    /// Check if selection is empty (anchor == active)
    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// Lower end of the selection
    pub fn start(&self) -> usize {
        self.anchor.min(self.active)
    }

    /// Upper end of the selection
    pub fn end(&self) -> usize {
        self.anchor.max(self.active)
    }

    /// Normalized byte range
    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Selected length in bytes
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    /// Check if selection is reversed (active before anchor)
    pub fn is_reversed(&self) -> bool {
        self.active < self.anchor
    }

    /// Extend selection to a new active offset
    pub fn extend_to(&mut self, offset: usize) {
        self.active = offset;
    }

    /// Collapse both ends onto `offset`
    pub fn collapse_to(&mut self, offset: usize) {
        self.anchor = offset;
        self.active = offset;
    }

    /// Pull both ends into `0..=len`
    pub fn clamp(&mut self, len: usize) {
        self.anchor = self.anchor.min(len);
        self.active = self.active.min(len);
    }
}
