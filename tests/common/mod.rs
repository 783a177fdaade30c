//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use pixelprism::clipboard::{HeadlessHost, SelectionClipboard, SurfaceId};
use pixelprism::editable::{EditSession, EntryEvent, EntryMsg, ValidationPolicy};

/// Surface of the entry under test
pub const ENTRY: SurfaceId = SurfaceId(1);
/// A second entry in the same process
pub const OTHER: SurfaceId = SurfaceId(2);
/// A window belonging to another client
pub const FOREIGN: SurfaceId = SurfaceId(99);

/// Clipboard backed by the in-memory host
pub fn headless() -> SelectionClipboard<HeadlessHost> {
    SelectionClipboard::new(HeadlessHost::new())
}

/// Create a test entry with given text, cursor at the end
pub fn test_entry(policy: ValidationPolicy, text: &str) -> EditSession {
    let mut session = EditSession::new(ENTRY, policy);
    session.set_text(text);
    session
}

/// Type `text` one character at a time. Returns the last event produced.
pub fn type_text(
    session: &mut EditSession,
    clipboard: &mut SelectionClipboard<HeadlessHost>,
    text: &str,
) -> Option<EntryEvent> {
    let mut last = None;
    for ch in text.chars() {
        last = session.update(EntryMsg::InsertChar(ch), clipboard).or(last);
    }
    last
}

/// Select the byte range `start..end` with the cursor at `end`
pub fn select(
    session: &mut EditSession,
    clipboard: &mut SelectionClipboard<HeadlessHost>,
    start: usize,
    end: usize,
) {
    session.update(
        EntryMsg::PlaceCursor {
            offset: start,
            extend: false,
        },
        clipboard,
    );
    session.update(
        EntryMsg::PlaceCursor {
            offset: end,
            extend: true,
        },
        clipboard,
    );
}
