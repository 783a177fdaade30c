//! One text entry: buffer, selection, history, validation and paste tickets
//! composed behind a single message-driven `update`.

use std::fmt;
use std::time::{Duration, Instant};

use crate::clipboard::{
    PasteTicket, SelectionClipboard, SelectionHost, Slot, SurfaceId, TicketStatus,
};
use crate::util::text::{word_at, word_end_after, word_start_before};

use super::buffer::TextBuffer;
use super::feedback::{ValidationFeedback, ValidationState};
use super::history::HistoryStack;
use super::messages::{EntryEvent, EntryMsg, MoveTarget};
use super::selection::Selection;
use super::validation::{CanonicalValue, ValidationPolicy};
use super::viewport::{MonospaceMeasure, TextMeasure, Viewport};

/// Editing state of one entry.
///
/// The cursor is the active end of the selection. Every intent either
/// completes or leaves the entry untouched, and yields at most one
/// [`EntryEvent`].
pub struct EditSession {
    surface: SurfaceId,
    buffer: TextBuffer,
    selection: Selection,
    history: HistoryStack,
    policy: ValidationPolicy,
    feedback: ValidationFeedback,
    viewport: Viewport,
    measure: Box<dyn TextMeasure>,
    /// Last value published by a commit or by the application
    committed: Option<CanonicalValue>,
    /// Text put back when a commit is rejected
    restore_text: String,
    auto_copy_primary: bool,
    pastes: Vec<PasteTicket>,
}

impl EditSession {
    pub fn new(surface: SurfaceId, policy: ValidationPolicy) -> Self {
        Self {
            surface,
            buffer: TextBuffer::new(),
            selection: Selection::default(),
            history: HistoryStack::default(),
            policy,
            feedback: ValidationFeedback::default(),
            viewport: Viewport::default(),
            measure: Box::new(MonospaceMeasure { advance: 8 }),
            committed: None,
            restore_text: String::new(),
            auto_copy_primary: true,
            pastes: Vec::new(),
        }
    }

    pub fn with_undo_depth(mut self, depth: usize) -> Self {
        self.history = HistoryStack::new(depth);
        self
    }

    pub fn with_flash(mut self, invalid_for: Duration, valid_for: Duration) -> Self {
        self.feedback = ValidationFeedback::new(invalid_for, valid_for);
        self
    }

    /// Mirror every selection change into the primary slot
    pub fn with_auto_copy_primary(mut self, enabled: bool) -> Self {
        self.auto_copy_primary = enabled;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Glyph measurement supplied by the renderer
    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    // =========================================================================
    // Read-only state for the renderer and the application
    // =========================================================================

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn cursor(&self) -> usize {
        self.selection.active
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_text(&self) -> &str {
        self.buffer.slice(self.selection.range())
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn validation_state(&self) -> ValidationState {
        self.feedback.state()
    }

    pub fn committed_value(&self) -> Option<&CanonicalValue> {
        self.committed.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Paste requests still waiting for an answer
    pub fn pending_pastes(&self) -> usize {
        self.pastes.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn can_cut(&self) -> bool {
        self.has_selection()
    }

    pub fn can_copy(&self) -> bool {
        self.has_selection()
    }

    pub fn can_paste<H: SelectionHost>(&self, clipboard: &SelectionClipboard<H>) -> bool {
        Slot::ALL.iter().any(|&slot| clipboard.has_owner(slot))
    }

    // =========================================================================
    // Application-driven changes (no history, no notification)
    // =========================================================================

    /// Replace the text, moving the cursor to the end. Until something is
    /// committed this text is also what a rejected commit falls back to.
    pub fn set_text(&mut self, text: &str) {
        self.replace_text(text);
        if self.committed.is_none() {
            self.restore_text = text.to_string();
        }
    }

    /// Show `value` in canonical form and treat it as already committed
    pub fn set_value(&mut self, value: CanonicalValue) {
        let canonical = self.policy.format(&value);
        self.replace_text(&canonical);
        self.restore_text = canonical;
        self.committed = Some(value);
    }

    /// Expire a running flash. Returns true when a redraw is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.feedback.tick(now)
    }

    /// Scroll so the caret is visible
    pub fn ensure_cursor_visible(&mut self) {
        let cursor = self.cursor();
        self.viewport
            .scroll_to_cursor(self.buffer.text(), cursor, self.measure.as_ref());
    }

    /// Tear down, abandoning any outstanding paste
    pub fn close<H: SelectionHost>(self, clipboard: &mut SelectionClipboard<H>) {
        for ticket in &self.pastes {
            clipboard.cancel(ticket.id());
        }
    }

    // =========================================================================
    // Intents
    // =========================================================================

    /// Run one intent to completion
    pub fn update<H: SelectionHost>(
        &mut self,
        msg: EntryMsg,
        clipboard: &mut SelectionClipboard<H>,
    ) -> Option<EntryEvent> {
        tracing::debug!(surface = ?self.surface, ?msg, "entry intent");

        let event = match msg {
            EntryMsg::Move(target) => {
                self.move_cursor(target, false);
                None
            }
            EntryMsg::MoveWithSelection(target) => {
                self.move_cursor(target, true);
                self.mirror_primary(clipboard);
                None
            }
            EntryMsg::PlaceCursor { offset, extend } => {
                let offset = self.buffer.floor_boundary(offset);
                if extend {
                    self.selection.extend_to(offset);
                    self.mirror_primary(clipboard);
                } else {
                    self.selection.collapse_to(offset);
                }
                None
            }
            EntryMsg::InsertChar(ch) => self.insert_char(ch).then_some(EntryEvent::Changed),
            EntryMsg::DeleteBackward => self.delete_backward().then_some(EntryEvent::Changed),
            EntryMsg::DeleteForward => self.delete_forward().then_some(EntryEvent::Changed),
            EntryMsg::Clear => self.clear().then_some(EntryEvent::Changed),
            EntryMsg::SelectWord => {
                let range = word_at(self.buffer.text(), self.cursor());
                self.selection = Selection::new(range.start, range.end);
                self.mirror_primary(clipboard);
                None
            }
            EntryMsg::SelectAll => {
                self.selection = Selection::new(0, self.buffer.len());
                self.mirror_primary(clipboard);
                None
            }
            EntryMsg::Copy => {
                self.copy(clipboard);
                None
            }
            EntryMsg::Cut => self.cut(clipboard).then_some(EntryEvent::Changed),
            EntryMsg::Paste(slot) => {
                let ticket = clipboard.request_text(self.surface, slot);
                self.pastes.push(ticket);
                self.pump()
            }
            EntryMsg::Undo => self.undo().then_some(EntryEvent::Changed),
            EntryMsg::Redo => self.redo().then_some(EntryEvent::Changed),
            EntryMsg::Commit => self.commit_at(Instant::now()),
        };

        self.ensure_cursor_visible();
        event
    }

    /// Apply every paste whose ticket has resolved. Called each dispatcher
    /// turn after the clipboard has handled its events.
    pub fn pump(&mut self) -> Option<EntryEvent> {
        let mut arrived = Vec::new();
        self.pastes.retain(|ticket| match ticket.poll() {
            TicketStatus::Pending => true,
            TicketStatus::Resolved(text) => {
                arrived.extend(text);
                false
            }
        });

        let mut changed = false;
        for text in arrived {
            changed |= self.paste_text(&text);
        }
        if changed {
            self.ensure_cursor_visible();
        }
        changed.then_some(EntryEvent::Changed)
    }

    /// Validate the whole text at `now`: publish a new value, ignore an
    /// unchanged one, or flash and restore the last good text.
    pub fn commit_at(&mut self, now: Instant) -> Option<EntryEvent> {
        match self.policy.parse(self.buffer.text()) {
            Err(err) => {
                tracing::debug!(surface = ?self.surface, %err, "commit rejected");
                self.feedback.flash_invalid(now);
                if self.buffer.text() == self.restore_text {
                    return None;
                }
                let restore = self.restore_text.clone();
                self.replace_text(&restore);
                Some(EntryEvent::Changed)
            }
            Ok(value) if self.committed.as_ref() == Some(&value) => None,
            Ok(value) => {
                tracing::debug!(surface = ?self.surface, ?value, "commit");
                self.feedback.flash_valid(now);
                let canonical = self.policy.format(&value);
                self.replace_text(&canonical);
                self.restore_text = canonical;
                self.committed = Some(value.clone());
                Some(EntryEvent::Committed(value))
            }
        }
    }

    // =========================================================================
    // Editing primitives
    // =========================================================================

    fn insert_char(&mut self, ch: char) -> bool {
        let range = self.selection.range();
        let text = self.buffer.text();
        let Some(accepted) = self
            .policy
            .accept(ch, &text[..range.start], &text[range.end..])
        else {
            return false;
        };

        let base_len = self.buffer.len() - range.len();
        let mut insert = String::new();
        insert.extend(self.policy.marker_for(accepted, base_len == 0));
        insert.push(accepted);
        if self.policy.exceeds_max_length(base_len, insert.len()) {
            return false;
        }

        self.history.push(self.buffer.get_text());
        self.replace_selection(&insert);
        true
    }

    /// Filter pasted text through the policy and splice what survives
    fn paste_text(&mut self, incoming: &str) -> bool {
        let range = self.selection.range();
        let base_len = self.buffer.len() - range.len();
        let mut head = self.buffer.text()[..range.start].to_string();
        let tail = &self.buffer.text()[range.end..];

        let mut filtered = String::new();
        for ch in incoming.chars() {
            let Some(accepted) = self.policy.accept(ch, &head, tail) else {
                continue;
            };
            let current = base_len + filtered.len();
            let mut piece = String::new();
            piece.extend(self.policy.marker_for(accepted, current == 0));
            piece.push(accepted);
            if self.policy.exceeds_max_length(current, piece.len()) {
                break;
            }
            head.push_str(&piece);
            filtered.push_str(&piece);
        }

        if filtered.is_empty() {
            return false;
        }
        self.history.push(self.buffer.get_text());
        self.replace_selection(&filtered);
        true
    }

    fn delete_backward(&mut self) -> bool {
        if self.has_selection() {
            self.history.push(self.buffer.get_text());
            self.replace_selection("");
            return true;
        }
        let cursor = self.cursor();
        if cursor == 0 {
            return false;
        }
        let prev = self.buffer.prev_boundary(cursor);
        self.history.push(self.buffer.get_text());
        self.buffer.delete_range(prev, cursor);
        self.selection.collapse_to(prev);
        true
    }

    fn delete_forward(&mut self) -> bool {
        if self.has_selection() {
            self.history.push(self.buffer.get_text());
            self.replace_selection("");
            return true;
        }
        let cursor = self.cursor();
        if cursor >= self.buffer.len() {
            return false;
        }
        let next = self.buffer.next_boundary(cursor);
        self.history.push(self.buffer.get_text());
        self.buffer.delete_range(cursor, next);
        true
    }

    fn clear(&mut self) -> bool {
        if self.buffer.is_empty() {
            return false;
        }
        self.history.push(self.buffer.get_text());
        self.buffer.set_text("");
        self.selection.collapse_to(0);
        true
    }

    fn copy<H: SelectionHost>(&mut self, clipboard: &mut SelectionClipboard<H>) -> bool {
        if !self.has_selection() {
            return false;
        }
        let text = self.selected_text().to_string();
        clipboard.set_text(self.surface, Some(&text), Slot::Clipboard);
        clipboard.set_text(self.surface, Some(&text), Slot::Primary);
        true
    }

    fn cut<H: SelectionHost>(&mut self, clipboard: &mut SelectionClipboard<H>) -> bool {
        if !self.copy(clipboard) {
            return false;
        }
        self.history.push(self.buffer.get_text());
        self.replace_selection("");
        true
    }

    fn undo(&mut self) -> bool {
        match self.history.undo(self.buffer.text()) {
            Some(snapshot) => {
                self.restore_snapshot(&snapshot);
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        match self.history.redo(self.buffer.text()) {
            Some(snapshot) => {
                self.restore_snapshot(&snapshot);
                true
            }
            None => false,
        }
    }

    fn move_cursor(&mut self, target: MoveTarget, extend: bool) {
        if !extend && self.has_selection() {
            match target {
                MoveTarget::Left | MoveTarget::WordLeft => {
                    self.selection.collapse_to(self.selection.start());
                    return;
                }
                MoveTarget::Right | MoveTarget::WordRight => {
                    self.selection.collapse_to(self.selection.end());
                    return;
                }
                MoveTarget::LineStart | MoveTarget::LineEnd => {}
            }
        }

        let cursor = self.cursor();
        let text = self.buffer.text();
        let to = match target {
            MoveTarget::Left => self.buffer.prev_boundary(cursor),
            MoveTarget::Right => self.buffer.next_boundary(cursor),
            MoveTarget::LineStart => 0,
            MoveTarget::LineEnd => text.len(),
            MoveTarget::WordLeft => word_start_before(text, cursor),
            MoveTarget::WordRight => word_end_after(text, cursor),
        };

        if extend {
            self.selection.extend_to(to);
        } else {
            self.selection.collapse_to(to);
        }
    }

    fn mirror_primary<H: SelectionHost>(&self, clipboard: &mut SelectionClipboard<H>) {
        if !self.auto_copy_primary {
            return;
        }
        if self.has_selection() {
            clipboard.set_text(self.surface, Some(self.selected_text()), Slot::Primary);
        } else {
            clipboard.set_text(self.surface, None, Slot::Primary);
        }
    }

    fn replace_selection(&mut self, text: &str) {
        let range = self.selection.range();
        self.buffer.delete_range(range.start, range.end);
        self.buffer.insert_at(range.start, text);
        self.selection.collapse_to(range.start + text.len());
    }

    fn replace_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.selection.collapse_to(self.buffer.len());
    }

    fn restore_snapshot(&mut self, snapshot: &str) {
        self.buffer.set_text(snapshot);
        let cursor = self.buffer.floor_boundary(self.cursor());
        self.selection.collapse_to(cursor);
    }
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("surface", &self.surface)
            .field("text", &self.buffer.text())
            .field("selection", &self.selection)
            .field("kind", &self.policy.kind)
            .field("state", &self.feedback.state())
            .field("committed", &self.committed)
            .field("pastes", &self.pastes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::HeadlessHost;

    const SURFACE: SurfaceId = SurfaceId(1);

    fn session(policy: ValidationPolicy, text: &str) -> EditSession {
        let mut session = EditSession::new(SURFACE, policy);
        session.set_text(text);
        session
    }

    fn clipboard() -> SelectionClipboard<HeadlessHost> {
        SelectionClipboard::new(HeadlessHost::new())
    }

    fn type_str(
        session: &mut EditSession,
        cb: &mut SelectionClipboard<HeadlessHost>,
        text: &str,
    ) {
        for ch in text.chars() {
            session.update(EntryMsg::InsertChar(ch), cb);
        }
    }

    #[test]
    fn test_insert_char() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "hllo");
        s.update(
            EntryMsg::PlaceCursor {
                offset: 1,
                extend: false,
            },
            &mut cb,
        );
        assert_eq!(
            s.update(EntryMsg::InsertChar('e'), &mut cb),
            Some(EntryEvent::Changed)
        );
        assert_eq!(s.text(), "hello");
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn test_rejected_char_is_silent() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::integer(), "12");
        assert_eq!(s.update(EntryMsg::InsertChar('x'), &mut cb), None);
        assert_eq!(s.text(), "12");
        assert!(!s.can_undo());
        assert_eq!(s.validation_state(), ValidationState::Normal);
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "hello world");
        s.update(EntryMsg::Move(MoveTarget::LineStart), &mut cb);
        for _ in 0..5 {
            s.update(EntryMsg::MoveWithSelection(MoveTarget::Right), &mut cb);
        }
        s.update(EntryMsg::InsertChar('X'), &mut cb);
        assert_eq!(s.text(), "X world");
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn test_max_length_checked_after_selection() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::integer().with_max_length(Some(3)), "255");
        assert_eq!(s.update(EntryMsg::InsertChar('1'), &mut cb), None);

        s.update(EntryMsg::SelectAll, &mut cb);
        assert_eq!(
            s.update(EntryMsg::InsertChar('9'), &mut cb),
            Some(EntryEvent::Changed)
        );
        assert_eq!(s.text(), "9");
    }

    #[test]
    fn test_hex_typing_adds_marker() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::hex(), "");
        type_str(&mut s, &mut cb, "ff00aa");
        assert_eq!(s.text(), "#FF00AA");

        // Buffer is full
        assert_eq!(s.update(EntryMsg::InsertChar('b'), &mut cb), None);
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "a°b");
        s.update(EntryMsg::DeleteBackward, &mut cb);
        assert_eq!(s.text(), "a°");
        s.update(EntryMsg::DeleteBackward, &mut cb);
        assert_eq!(s.text(), "a");

        s.update(EntryMsg::Move(MoveTarget::LineStart), &mut cb);
        assert_eq!(s.update(EntryMsg::DeleteBackward, &mut cb), None);
        s.update(EntryMsg::DeleteForward, &mut cb);
        assert_eq!(s.text(), "");
        assert_eq!(s.update(EntryMsg::DeleteForward, &mut cb), None);
    }

    #[test]
    fn test_undo_restores_and_collapses() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "abc");
        s.update(EntryMsg::SelectAll, &mut cb);
        s.update(EntryMsg::InsertChar('z'), &mut cb);
        assert_eq!(s.text(), "z");

        assert_eq!(s.update(EntryMsg::Undo, &mut cb), Some(EntryEvent::Changed));
        assert_eq!(s.text(), "abc");
        assert!(!s.has_selection());
        assert_eq!(s.cursor(), 1);

        assert_eq!(s.update(EntryMsg::Redo, &mut cb), Some(EntryEvent::Changed));
        assert_eq!(s.text(), "z");
    }

    #[test]
    fn test_undo_clamps_cursor() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "");
        type_str(&mut s, &mut cb, "abcd");
        s.update(EntryMsg::Undo, &mut cb);
        assert_eq!(s.text(), "abc");
        assert_eq!(s.cursor(), 3);
    }

    #[test]
    fn test_redo_invalidated_by_edit() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "");
        type_str(&mut s, &mut cb, "ab");
        s.update(EntryMsg::Undo, &mut cb);
        s.update(EntryMsg::InsertChar('x'), &mut cb);
        assert_eq!(s.update(EntryMsg::Redo, &mut cb), None);
        assert_eq!(s.text(), "ax");
    }

    #[test]
    fn test_clear_is_one_undo_step() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "hello");
        s.update(EntryMsg::Clear, &mut cb);
        assert_eq!(s.text(), "");
        s.update(EntryMsg::Undo, &mut cb);
        assert_eq!(s.text(), "hello");
    }

    #[test]
    fn test_word_movement() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "hello world");
        s.update(EntryMsg::Move(MoveTarget::LineStart), &mut cb);
        s.update(EntryMsg::Move(MoveTarget::WordRight), &mut cb);
        assert_eq!(s.cursor(), 6);
        s.update(EntryMsg::Move(MoveTarget::WordLeft), &mut cb);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_move_collapses_selection_to_edge() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "hello");
        s.update(EntryMsg::SelectAll, &mut cb);
        s.update(EntryMsg::Move(MoveTarget::Left), &mut cb);
        assert_eq!(s.selection(), Selection::collapsed(0));
    }

    #[test]
    fn test_select_word_mirrors_primary() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::hex(), "#FF00AA");
        s.update(
            EntryMsg::PlaceCursor {
                offset: 3,
                extend: false,
            },
            &mut cb,
        );
        s.update(EntryMsg::SelectWord, &mut cb);
        assert_eq!(s.selected_text(), "FF00AA");
        assert_eq!(cb.owned_text(Slot::Primary), Some("FF00AA"));

        s.update(EntryMsg::Move(MoveTarget::LineEnd), &mut cb);
        s.update(EntryMsg::MoveWithSelection(MoveTarget::LineEnd), &mut cb);
        assert_eq!(cb.owned_text(Slot::Primary), None);
    }

    #[test]
    fn test_auto_copy_primary_disabled() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "abc").with_auto_copy_primary(false);
        s.update(EntryMsg::SelectAll, &mut cb);
        assert_eq!(cb.owned_text(Slot::Primary), None);
        assert!(cb.host().requests().is_empty());
    }

    #[test]
    fn test_copy_sets_both_slots_without_history() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "abcdef");
        s.update(
            EntryMsg::PlaceCursor {
                offset: 1,
                extend: false,
            },
            &mut cb,
        );
        s.update(
            EntryMsg::PlaceCursor {
                offset: 4,
                extend: true,
            },
            &mut cb,
        );
        assert_eq!(s.update(EntryMsg::Copy, &mut cb), None);
        assert_eq!(cb.owned_text(Slot::Clipboard), Some("bcd"));
        assert_eq!(cb.owned_text(Slot::Primary), Some("bcd"));
        assert!(!s.can_undo());
    }

    #[test]
    fn test_cut_and_loopback_paste() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "abcdef");
        s.update(
            EntryMsg::PlaceCursor {
                offset: 4,
                extend: true,
            },
            &mut cb,
        );
        // Anchor at the end of the text, active at 4
        assert_eq!(s.update(EntryMsg::Cut, &mut cb), Some(EntryEvent::Changed));
        assert_eq!(s.text(), "abcd");
        assert_eq!(cb.owned_text(Slot::Clipboard), Some("ef"));

        s.update(EntryMsg::Move(MoveTarget::LineStart), &mut cb);
        assert_eq!(
            s.update(EntryMsg::Paste(Slot::Clipboard), &mut cb),
            Some(EntryEvent::Changed)
        );
        assert_eq!(s.text(), "efabcd");
        assert_eq!(s.pending_pastes(), 0);
    }

    #[test]
    fn test_cut_without_selection_is_noop() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "abc");
        assert_eq!(s.update(EntryMsg::Cut, &mut cb), None);
        assert!(!s.can_cut());
        assert_eq!(cb.owned_text(Slot::Clipboard), None);
    }

    #[test]
    fn test_paste_is_filtered() {
        let mut cb = clipboard();
        cb.host_mut()
            .serve_foreign(Slot::Clipboard, SurfaceId(50), "1a2,b 3\n4");
        let mut s = session(ValidationPolicy::integer(), "");

        assert_eq!(s.update(EntryMsg::Paste(Slot::Clipboard), &mut cb), None);
        assert_eq!(s.pending_pastes(), 1);

        cb.pump();
        assert_eq!(s.pump(), Some(EntryEvent::Changed));
        assert_eq!(s.text(), "12, 34");
    }

    #[test]
    fn test_paste_respects_max_length_after_selection() {
        let mut cb = clipboard();
        cb.host_mut()
            .serve_foreign(Slot::Primary, SurfaceId(50), "123456");
        let mut s = session(ValidationPolicy::integer().with_max_length(Some(5)), "9999");
        s.update(
            EntryMsg::PlaceCursor {
                offset: 2,
                extend: true,
            },
            &mut cb,
        );
        // Selecting moved the primary slot to us; hand it back
        cb.host_mut()
            .serve_foreign(Slot::Primary, SurfaceId(50), "123456");
        cb.pump();

        s.update(EntryMsg::Paste(Slot::Primary), &mut cb);
        cb.pump();
        s.pump();
        assert_eq!(s.text(), "99123");
    }

    #[test]
    fn test_rejected_paste_leaves_history_alone() {
        let mut cb = clipboard();
        cb.host_mut()
            .serve_foreign(Slot::Clipboard, SurfaceId(50), "xyz");
        let mut s = session(ValidationPolicy::hex(), "#123");
        s.update(EntryMsg::Paste(Slot::Clipboard), &mut cb);
        cb.pump();
        assert_eq!(s.pump(), None);
        assert!(!s.can_undo());
    }

    #[test]
    fn test_commit_valid_then_idempotent() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::rgb_integer(), "");
        type_str(&mut s, &mut cb, "255,0,0");

        let event = s.update(EntryMsg::Commit, &mut cb);
        assert_eq!(
            event,
            Some(EntryEvent::Committed(CanonicalValue::Integers(vec![
                255, 0, 0
            ])))
        );
        assert_eq!(s.text(), "255, 0, 0");
        assert_eq!(s.validation_state(), ValidationState::FlashValid);

        assert_eq!(s.update(EntryMsg::Commit, &mut cb), None);
    }

    #[test]
    fn test_commit_invalid_restores() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::rgb_integer(), "");
        s.set_value(CanonicalValue::Integers(vec![10, 20, 30]));
        assert_eq!(s.text(), "10, 20, 30");

        s.update(EntryMsg::SelectAll, &mut cb);
        s.update(EntryMsg::InsertChar('9'), &mut cb);
        let now = Instant::now();
        assert_eq!(s.commit_at(now), Some(EntryEvent::Changed));
        assert_eq!(s.text(), "10, 20, 30");
        assert_eq!(s.validation_state(), ValidationState::FlashInvalid);

        assert!(s.tick(now + Duration::from_millis(150)));
        assert_eq!(s.validation_state(), ValidationState::Normal);
    }

    #[test]
    fn test_commit_empty_restores_initial_text() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::integer(), "255");
        s.update(EntryMsg::Clear, &mut cb);
        assert_eq!(s.update(EntryMsg::Commit, &mut cb), Some(EntryEvent::Changed));
        assert_eq!(s.text(), "255");
        assert_eq!(s.validation_state(), ValidationState::FlashInvalid);
    }

    #[test]
    fn test_set_text_keeps_history() {
        let mut cb = clipboard();
        let mut s = session(ValidationPolicy::text(), "");
        type_str(&mut s, &mut cb, "ab");
        s.update(EntryMsg::SelectAll, &mut cb);
        s.set_text("other");
        assert_eq!(s.cursor(), 5);
        assert!(!s.has_selection());
        assert_eq!(s.history().undo_count(), 2);
    }

    #[test]
    fn test_close_cancels_pending_paste() {
        let mut cb = clipboard();
        cb.host_mut().foreign_claim(
            Slot::Clipboard,
            SurfaceId(50),
            crate::clipboard::ForeignReply::Silent,
        );
        let mut s = session(ValidationPolicy::text(), "");
        s.update(EntryMsg::Paste(Slot::Clipboard), &mut cb);
        assert_eq!(cb.pending_count(), 1);
        s.close(&mut cb);
        assert_eq!(cb.pending_count(), 0);
    }

    #[test]
    fn test_scroll_follows_typing() {
        let mut cb = clipboard();
        let mut s = EditSession::new(SURFACE, ValidationPolicy::text())
            .with_viewport(Viewport::new(60, 4))
            .with_measure(Box::new(MonospaceMeasure { advance: 10 }));
        type_str(&mut s, &mut cb, "abcdefghij");
        assert!(s.viewport().scroll_x > 0);
    }
}
