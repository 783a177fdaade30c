//! Bridge from the clipboard slot to the OS clipboard via `arboard`.
//!
//! The OS clipboard has no notion of surfaces or transfer channels, so the
//! protocol is simulated: conversions read the OS clipboard synchronously and
//! queue a transfer-ready event for the next pump. The primary slot stays
//! in-process.
//!
//! Other applications never notify us when they copy. Ownership of the
//! clipboard slot is checked by comparing the OS clipboard against the text
//! we last wrote; a mismatch means someone else took it.

use std::collections::{HashMap, VecDeque};

use super::protocol::{
    SelectionEvent, Slot, SurfaceId, Target, TransferChannel, TransferPayload, TransferReady,
    TransferRequest,
};
use super::SelectionHost;

/// Stand-in identity for "some other application" holding the OS clipboard
pub const SYSTEM_SURFACE: SurfaceId = SurfaceId(u64::MAX);

#[derive(Debug, Default)]
pub struct SystemHost {
    owners: HashMap<Slot, SurfaceId>,
    /// Text we last wrote to the OS clipboard
    claimed: Option<String>,
    properties: HashMap<(SurfaceId, TransferChannel), TransferPayload>,
    inbox: VecDeque<SelectionEvent>,
}

impl SystemHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_os_clipboard() -> Option<String> {
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => clipboard.get_text().ok(),
            Err(err) => {
                tracing::debug!("OS clipboard unavailable: {}", err);
                None
            }
        }
    }

    /// Whether the OS clipboard no longer holds what we wrote. Unreadable
    /// contents (non-text data, no clipboard) leave ownership as it was.
    fn taken_by_other(&self, os_text: Option<&str>) -> bool {
        match (self.claimed.as_deref(), os_text) {
            (Some(claimed), Some(os_text)) => claimed != os_text,
            _ => false,
        }
    }

    /// Drop our claim on the clipboard slot if another application took it
    fn sync_ownership(&mut self, os_text: Option<&str>) {
        let Some(&surface) = self.owners.get(&Slot::Clipboard) else {
            return;
        };
        if !self.taken_by_other(os_text) {
            return;
        }
        tracing::debug!(?surface, "OS clipboard taken by another application");
        self.owners.remove(&Slot::Clipboard);
        self.claimed = None;
        self.inbox.push_back(SelectionEvent::OwnershipLost {
            slot: Slot::Clipboard,
            surface,
        });
    }
}

impl SelectionHost for SystemHost {
    fn owner(&self, slot: Slot) -> Option<SurfaceId> {
        match slot {
            Slot::Clipboard => {
                let os_text = Self::read_os_clipboard();
                match self.owners.get(&slot) {
                    Some(_) if self.taken_by_other(os_text.as_deref()) => Some(SYSTEM_SURFACE),
                    Some(owner) => Some(*owner),
                    None => os_text.filter(|text| !text.is_empty()).map(|_| SYSTEM_SURFACE),
                }
            }
            Slot::Primary => self.owners.get(&slot).copied(),
        }
    }

    fn claim(&mut self, slot: Slot, surface: SurfaceId, text: &str) {
        self.owners.insert(slot, surface);
        if slot == Slot::Clipboard {
            self.claimed = Some(text.to_string());
            if let Ok(mut clipboard) = arboard::Clipboard::new() {
                if let Err(err) = clipboard.set_text(text) {
                    tracing::warn!("Failed to write OS clipboard: {}", err);
                }
            }
        }
    }

    fn release(&mut self, slot: Slot, surface: SurfaceId) {
        if self.owners.get(&slot) != Some(&surface) {
            return;
        }
        self.owners.remove(&slot);
        if slot != Slot::Clipboard {
            return;
        }
        // Leave the OS clipboard alone once another application wrote to it
        let os_text = Self::read_os_clipboard();
        let taken = self.taken_by_other(os_text.as_deref());
        self.claimed = None;
        if taken {
            return;
        }
        if let Ok(mut clipboard) = arboard::Clipboard::new() {
            if let Err(err) = clipboard.clear() {
                tracing::warn!("Failed to clear OS clipboard: {}", err);
            }
        }
    }

    fn convert(
        &mut self,
        requester: SurfaceId,
        slot: Slot,
        target: Target,
        channel: TransferChannel,
    ) {
        let text = match slot {
            Slot::Clipboard => Self::read_os_clipboard(),
            Slot::Primary => None,
        };
        let channel = text.map(|text| {
            self.properties
                .insert((requester, channel), TransferPayload::utf8(&text));
            channel
        });
        self.inbox
            .push_back(SelectionEvent::TransferReady(TransferReady {
                requester,
                slot,
                target,
                channel,
            }));
    }

    fn take_payload(
        &mut self,
        requester: SurfaceId,
        channel: TransferChannel,
    ) -> Option<TransferPayload> {
        self.properties.remove(&(requester, channel))
    }

    fn respond(&mut self, request: &TransferRequest, payload: Option<TransferPayload>) {
        // The OS serves its own clipboard; requests only arrive from tests
        tracing::debug!(?request, answered = payload.is_some(), "transfer response");
    }

    fn poll_events(&mut self) -> Vec<SelectionEvent> {
        if self.owners.contains_key(&Slot::Clipboard) {
            let os_text = Self::read_os_clipboard();
            self.sync_ownership(os_text.as_deref());
        }
        self.inbox.drain(..).collect()
    }
}
