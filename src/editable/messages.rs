//! Intents handled by an [`EditSession`](super::EditSession) and the
//! notifications it answers with.

use serde::Serialize;

use crate::clipboard::Slot;

use super::validation::CanonicalValue;

/// Target for cursor movement operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    /// Move one character left
    Left,
    /// Move one character right
    Right,
    /// Move to start of line
    LineStart,
    /// Move to end of line
    LineEnd,
    /// Move one word left
    WordLeft,
    /// Move one word right
    WordRight,
}

/// One user intent. Each runs to completion before the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryMsg {
    // === Movement ===
    /// Move cursor, collapsing any selection
    Move(MoveTarget),
    /// Move cursor and extend selection
    MoveWithSelection(MoveTarget),
    /// Put the cursor at a byte offset (mouse press, or drag with `extend`)
    PlaceCursor { offset: usize, extend: bool },

    // === Insertion / deletion ===
    /// Insert a typed character
    InsertChar(char),
    /// Delete character before cursor (Backspace)
    DeleteBackward,
    /// Delete character after cursor (Delete)
    DeleteForward,
    /// Remove all text as one undoable edit
    Clear,

    // === Selection ===
    /// Select the word under the cursor
    SelectWord,
    /// Select all text
    SelectAll,

    // === Clipboard ===
    Copy,
    Cut,
    /// Paste from a slot (Ctrl+V reads the clipboard, middle click the primary)
    Paste(Slot),

    // === Undo/Redo ===
    Undo,
    Redo,

    /// Validate and publish the text (Enter, or focus loss)
    Commit,
}

impl EntryMsg {
    /// Check if this message may modify the buffer
    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            EntryMsg::InsertChar(_)
                | EntryMsg::DeleteBackward
                | EntryMsg::DeleteForward
                | EntryMsg::Clear
                | EntryMsg::Cut
                | EntryMsg::Paste(_)
                | EntryMsg::Undo
                | EntryMsg::Redo
                | EntryMsg::Commit
        )
    }

    /// Check if this message changes the selection
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            EntryMsg::MoveWithSelection(_)
                | EntryMsg::PlaceCursor { extend: true, .. }
                | EntryMsg::SelectAll
                | EntryMsg::SelectWord
        )
    }
}

/// What an intent produced, at most one per intent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EntryEvent {
    /// Visible text changed
    Changed,
    /// A new canonical value was committed
    Committed(CanonicalValue),
}
