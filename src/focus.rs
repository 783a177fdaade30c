//! Keyboard focus across the entries of one window.
//!
//! Exactly one entry, or none, receives keyboard intents. Focus moves only
//! through explicit calls, and the entry losing focus is committed on the
//! way out.

use std::time::Instant;

use crate::clipboard::{SelectionClipboard, SelectionHost};
use crate::editable::{EditSession, EntryEvent, EntryMsg};

/// Handle to an entry registered with a [`FocusManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub usize);

/// Owns the entries and the single focused handle
#[derive(Debug, Default)]
pub struct FocusManager {
    entries: Vec<Option<EditSession>>,
    focused: Option<EntryId>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry. Focus order follows registration order.
    pub fn add(&mut self, session: EditSession) -> EntryId {
        self.entries.push(Some(session));
        EntryId(self.entries.len() - 1)
    }

    /// Close an entry, abandoning its outstanding pastes. Its id is not reused.
    pub fn remove<H: SelectionHost>(
        &mut self,
        id: EntryId,
        clipboard: &mut SelectionClipboard<H>,
    ) -> bool {
        let Some(session) = self.entries.get_mut(id.0).and_then(Option::take) else {
            return false;
        };
        if self.focused == Some(id) {
            self.focused = None;
        }
        session.close(clipboard);
        true
    }

    pub fn get(&self, id: EntryId) -> Option<&EditSession> {
        self.entries.get(id.0)?.as_ref()
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut EditSession> {
        self.entries.get_mut(id.0)?.as_mut()
    }

    pub fn focused(&self) -> Option<EntryId> {
        self.focused
    }

    pub fn focused_entry(&self) -> Option<&EditSession> {
        self.get(self.focused?)
    }

    /// Live entries in focus order
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &EditSession)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (EntryId(i), e)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move focus to `id`, committing the entry that loses it
    pub fn focus(&mut self, id: EntryId) -> Option<(EntryId, EntryEvent)> {
        self.focus_at(id, Instant::now())
    }

    pub fn focus_at(&mut self, id: EntryId, now: Instant) -> Option<(EntryId, EntryEvent)> {
        if self.focused == Some(id) {
            return None;
        }
        if self.get(id).is_none() {
            tracing::debug!(?id, "focus request for unknown entry");
            return None;
        }
        let event = self.blur_at(now);
        tracing::debug!(?id, "focus");
        self.focused = Some(id);
        event
    }

    /// Drop focus entirely, committing the entry that had it
    pub fn blur(&mut self) -> Option<(EntryId, EntryEvent)> {
        self.blur_at(Instant::now())
    }

    pub fn blur_at(&mut self, now: Instant) -> Option<(EntryId, EntryEvent)> {
        let id = self.focused.take()?;
        let event = self.get_mut(id)?.commit_at(now)?;
        Some((id, event))
    }

    /// Tab / Shift+Tab: focus the next or previous live entry, wrapping
    pub fn cycle(&mut self, forward: bool) -> Option<(EntryId, EntryEvent)> {
        self.cycle_at(forward, Instant::now())
    }

    pub fn cycle_at(&mut self, forward: bool, now: Instant) -> Option<(EntryId, EntryEvent)> {
        let ids: Vec<EntryId> = self.iter().map(|(id, _)| id).collect();
        if ids.is_empty() {
            return None;
        }
        let next = match self.focused.and_then(|f| ids.iter().position(|&id| id == f)) {
            Some(pos) if forward => ids[(pos + 1) % ids.len()],
            Some(pos) => ids[(pos + ids.len() - 1) % ids.len()],
            None if forward => ids[0],
            None => ids[ids.len() - 1],
        };
        self.focus_at(next, now)
    }

    /// Route a keyboard intent to the focused entry. Dropped when nothing
    /// has focus.
    pub fn dispatch<H: SelectionHost>(
        &mut self,
        msg: EntryMsg,
        clipboard: &mut SelectionClipboard<H>,
    ) -> Option<(EntryId, EntryEvent)> {
        let id = self.focused?;
        let event = self.get_mut(id)?.update(msg, clipboard)?;
        Some((id, event))
    }

    /// Route an intent to a specific entry (mouse input targets whatever is
    /// under the pointer)
    pub fn dispatch_to<H: SelectionHost>(
        &mut self,
        id: EntryId,
        msg: EntryMsg,
        clipboard: &mut SelectionClipboard<H>,
    ) -> Option<EntryEvent> {
        self.get_mut(id)?.update(msg, clipboard)
    }

    /// Deliver resolved pastes to every entry, focused or not
    pub fn pump(&mut self) -> Vec<(EntryId, EntryEvent)> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter_map(|(i, e)| Some((EntryId(i), e.as_mut()?.pump()?)))
            .collect()
    }

    /// Expire validation flashes. Returns true when any entry needs a redraw.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.entries
            .iter_mut()
            .flatten()
            .fold(false, |redraw, e| e.tick(now) || redraw)
    }
}
