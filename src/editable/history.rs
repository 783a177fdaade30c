//! Edit history (undo/redo) for text entries.
//!
//! History stores whole-text snapshots rather than deltas. Entry text is short
//! and the depth is bounded, so memory is `undo_depth` copies of the text at
//! most.

use std::collections::VecDeque;

/// Default number of undo snapshots kept per entry
pub const DEFAULT_UNDO_DEPTH: usize = 64;

/// Undo/redo stacks of text snapshots.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    undo_stack: VecDeque<String>,
    redo_stack: Vec<String>,
    capacity: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

impl HistoryStack {
    /// Create a history holding at most `capacity` undo snapshots (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(capacity),
            redo_stack: Vec::new(),
            capacity,
        }
    }

    /// Record the state before an edit. Evicts the oldest snapshot when full
    /// and always discards the redo branch.
    pub fn push(&mut self, snapshot: String) {
        self.redo_stack.clear();
        self.push_undo(snapshot);
    }

    /// Step back: returns the previous snapshot and remembers `current` for redo
    pub fn undo(&mut self, current: &str) -> Option<String> {
        let snapshot = self.undo_stack.pop_back()?;
        self.redo_stack.push(current.to_string());
        Some(snapshot)
    }

    /// Step forward: returns the undone snapshot and remembers `current` for undo
    pub fn redo(&mut self, current: &str) -> Option<String> {
        let snapshot = self.redo_stack.pop()?;
        self.push_undo(current.to_string());
        Some(snapshot)
    }

    fn push_undo(&mut self, snapshot: String) {
        if self.undo_stack.len() >= self.capacity {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(snapshot);
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of snapshots in the undo stack
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of snapshots in the redo stack
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
