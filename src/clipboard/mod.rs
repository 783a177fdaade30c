//! Process-wide selection clipboard.
//!
//! Two slots ([`Slot::Primary`] and [`Slot::Clipboard`]) are shared by every
//! entry in the process. Pastes are logically asynchronous: [`request_text`]
//! returns a [`PasteTicket`] immediately and the text arrives on a later
//! dispatcher turn, when the matching transfer-ready event is handled.
//!
//! Every request resolves exactly once, with `Some(text)` or `None`. All
//! failure paths (no owner, denial, unsupported target, incremental transfer,
//! full table, timeout, teardown) collapse to `None`.
//!
//! [`request_text`]: SelectionClipboard::request_text

mod host;
mod protocol;
mod system;

pub use host::{ForeignReply, HeadlessHost, HostRequest, HostResponse, SelectionHost};
pub use protocol::{
    SelectionEvent, Slot, SurfaceId, Target, TransferChannel, TransferPayload, TransferReady,
    TransferRequest, SUPPORTED_TARGETS,
};
pub use system::SystemHost;

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Default capacity of the pending-request table
pub const MAX_PENDING_REQUESTS: usize = 8;

/// Why a paste resolved without data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("no owner for {0:?} selection")]
    NoOwner(Slot),
    #[error("owner denied the transfer")]
    Denied,
    #[error("unsupported transfer target {0:?}")]
    UnsupportedTarget(Option<Target>),
    #[error("incremental transfers are not supported")]
    Incremental,
    #[error("pending request table full ({0} entries)")]
    CapacityExceeded(usize),
    #[error("no answer after {0:?}")]
    TimedOut(Duration),
    #[error("request abandoned")]
    Abandoned,
}

/// Correlation id of a paste request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Result of polling a [`PasteTicket`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketStatus {
    Pending,
    Resolved(Option<String>),
}

/// Receiving half of one paste request
#[derive(Debug)]
pub struct PasteTicket {
    id: RequestId,
    receiver: Receiver<Option<String>>,
}

impl PasteTicket {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Non-blocking check. Once this returns `Resolved` the ticket is spent.
    pub fn poll(&self) -> TicketStatus {
        match self.receiver.try_recv() {
            Ok(text) => TicketStatus::Resolved(text),
            Err(TryRecvError::Empty) => TicketStatus::Pending,
            Err(TryRecvError::Disconnected) => TicketStatus::Resolved(None),
        }
    }
}

#[derive(Debug)]
struct PendingRequest {
    id: RequestId,
    requester: SurfaceId,
    slot: Slot,
    issued: Instant,
    resolver: SyncSender<Option<String>>,
}

#[derive(Debug, Default, Clone)]
struct SlotData {
    text: Option<String>,
    owner: Option<SurfaceId>,
}

/// Shared two-slot clipboard driving a [`SelectionHost`]
pub struct SelectionClipboard<H: SelectionHost> {
    host: H,
    slots: [SlotData; 2],
    /// Index in this table doubles as the transfer channel
    pending: Vec<Option<PendingRequest>>,
    next_id: u64,
    timeout: Option<Duration>,
}

impl<H: SelectionHost> SelectionClipboard<H> {
    pub fn new(host: H) -> Self {
        Self::with_capacity(host, MAX_PENDING_REQUESTS)
    }

    /// Create a clipboard whose pending table holds `capacity` requests (minimum 1)
    pub fn with_capacity(host: H, capacity: usize) -> Self {
        let mut pending = Vec::new();
        pending.resize_with(capacity.max(1), || None);
        Self {
            host,
            slots: [SlotData::default(), SlotData::default()],
            pending,
            next_id: 0,
            timeout: None,
        }
    }

    /// Resolve requests older than `timeout` with no data in [`expire`](Self::expire)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn capacity(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.iter().filter(|p| p.is_some()).count()
    }

    /// Text this process owns in `slot`
    pub fn owned_text(&self, slot: Slot) -> Option<&str> {
        self.slots[slot.index()].text.as_deref()
    }

    /// Whether anyone (this process or another client) owns `slot`
    pub fn has_owner(&self, slot: Slot) -> bool {
        self.host.owner(slot).is_some()
    }

    /// Publish `text` in `slot` on behalf of `surface`, or release the slot
    /// when `text` is `None`. Only the owning surface can release.
    pub fn set_text(&mut self, surface: SurfaceId, text: Option<&str>, slot: Slot) {
        let data = &mut self.slots[slot.index()];
        match text {
            Some(text) => {
                tracing::debug!(?slot, ?surface, len = text.len(), "claim selection");
                data.text = Some(text.to_string());
                data.owner = Some(surface);
                self.host.claim(slot, surface, text);
            }
            None if data.owner == Some(surface) => {
                tracing::debug!(?slot, ?surface, "release selection");
                data.text = None;
                data.owner = None;
                self.host.release(slot, surface);
            }
            None => {
                // Another surface holds the slot; releasing would strand it
                tracing::debug!(?slot, ?surface, owner = ?data.owner, "release by non-owner ignored");
            }
        }
    }

    /// Ask for the contents of `slot`. Always returns immediately; the ticket
    /// may already be resolved.
    pub fn request_text(&mut self, surface: SurfaceId, slot: Slot) -> PasteTicket {
        let (resolver, receiver) = mpsc::sync_channel(1);
        let id = RequestId(self.next_id);
        self.next_id += 1;
        let ticket = PasteTicket { id, receiver };

        let Some(owner) = self.host.owner(slot) else {
            Self::send(id, &resolver, Err(ClipboardError::NoOwner(slot)));
            return ticket;
        };

        let data = &self.slots[slot.index()];
        if data.owner == Some(owner) {
            if let Some(text) = &data.text {
                tracing::debug!(?id, ?slot, "loopback paste");
                Self::send(id, &resolver, Ok(text.clone()));
                return ticket;
            }
        }

        let Some(index) = self.pending.iter().position(Option::is_none) else {
            tracing::warn!(?id, ?slot, "clipboard request table full");
            Self::send(
                id,
                &resolver,
                Err(ClipboardError::CapacityExceeded(self.pending.len())),
            );
            return ticket;
        };

        let channel = TransferChannel(index);
        self.pending[index] = Some(PendingRequest {
            id,
            requester: surface,
            slot,
            issued: Instant::now(),
            resolver,
        });
        tracing::debug!(?id, ?slot, ?owner, ?channel, "convert selection");
        self.host.convert(surface, slot, Target::Utf8String, channel);
        ticket
    }

    /// Drain the host's queued events. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let events = self.host.poll_events();
        events
            .into_iter()
            .filter(|event| self.handle_event(event))
            .count()
    }

    /// Process one selection event. Returns false when the event did not
    /// concern this clipboard.
    pub fn handle_event(&mut self, event: &SelectionEvent) -> bool {
        match event {
            SelectionEvent::TransferRequest(request) => {
                self.answer_request(request);
                true
            }
            SelectionEvent::TransferReady(ready) => self.transfer_ready(ready),
            SelectionEvent::OwnershipLost { slot, surface } => {
                let data = &mut self.slots[slot.index()];
                if data.owner != Some(*surface) {
                    return false;
                }
                tracing::debug!(?slot, ?surface, "selection ownership lost");
                data.text = None;
                data.owner = None;
                true
            }
        }
    }

    /// Resolve every request issued more than the configured timeout before
    /// `now`. Returns how many were resolved.
    pub fn expire(&mut self, now: Instant) -> usize {
        let Some(timeout) = self.timeout else {
            return 0;
        };
        let overdue: Vec<usize> = self
            .pending
            .iter()
            .enumerate()
            .filter_map(|(index, p)| {
                let p = p.as_ref()?;
                (now.saturating_duration_since(p.issued) >= timeout).then_some(index)
            })
            .collect();
        for &index in &overdue {
            self.resolve(index, Err(ClipboardError::TimedOut(timeout)));
        }
        overdue.len()
    }

    /// Give up on a request. Its ticket resolves with no data.
    pub fn cancel(&mut self, id: RequestId) -> bool {
        let Some(index) = self
            .pending
            .iter()
            .position(|p| p.as_ref().is_some_and(|p| p.id == id))
        else {
            return false;
        };
        self.resolve(index, Err(ClipboardError::Abandoned));
        true
    }

    fn answer_request(&mut self, request: &TransferRequest) {
        let data = &self.slots[request.slot.index()];
        let owned = data.owner == Some(request.owner);
        let text = match &data.text {
            Some(text) if owned && request.requester != request.owner => text,
            _ => {
                tracing::debug!(?request, "deny transfer request");
                self.host.respond(request, None);
                return;
            }
        };

        let payload = match &request.target {
            Target::Targets => Some(TransferPayload::TargetList(SUPPORTED_TARGETS.to_vec())),
            Target::Utf8String => Some(TransferPayload::utf8(text)),
            Target::String => Some(TransferPayload::latin1(text)),
            other => {
                tracing::debug!(requested = ?other, "deny unsupported target");
                None
            }
        };
        self.host.respond(request, payload);
    }

    fn transfer_ready(&mut self, ready: &TransferReady) -> bool {
        // A denial names no channel, so it is matched on requester and slot
        let found = self.pending.iter().enumerate().find_map(|(index, p)| {
            let p = p.as_ref()?;
            let channel_matches = ready.channel.map_or(true, |c| c == TransferChannel(index));
            (p.requester == ready.requester && p.slot == ready.slot && channel_matches)
                .then_some(index)
        });
        let Some(index) = found else {
            tracing::debug!(?ready, "transfer ready for unknown request");
            return false;
        };

        let outcome = match ready.channel {
            None => Err(ClipboardError::Denied),
            Some(channel) => match self.host.take_payload(ready.requester, channel) {
                None => Err(ClipboardError::Denied),
                Some(payload) => match payload.target() {
                    Some(Target::Incremental) => {
                        tracing::warn!(
                            slot = ?ready.slot,
                            "incremental selection transfer not supported"
                        );
                        Err(ClipboardError::Incremental)
                    }
                    Some(target) if target.is_text() => {
                        payload.decode_text().ok_or(ClipboardError::Denied)
                    }
                    target => Err(ClipboardError::UnsupportedTarget(target.cloned())),
                },
            },
        };
        self.resolve(index, outcome);
        true
    }

    fn resolve(&mut self, index: usize, outcome: Result<String, ClipboardError>) {
        if let Some(request) = self.pending[index].take() {
            Self::send(request.id, &request.resolver, outcome);
        }
    }

    fn send(
        id: RequestId,
        resolver: &SyncSender<Option<String>>,
        outcome: Result<String, ClipboardError>,
    ) {
        let text = match outcome {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::debug!(?id, %err, "paste resolved without data");
                None
            }
        };
        // The receiver may already be gone; nothing left to notify then
        let _ = resolver.try_send(text);
    }
}

impl<H: SelectionHost> Drop for SelectionClipboard<H> {
    fn drop(&mut self) {
        for index in 0..self.pending.len() {
            self.resolve(index, Err(ClipboardError::Abandoned));
        }
    }
}

impl<H: SelectionHost + std::fmt::Debug> std::fmt::Debug for SelectionClipboard<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionClipboard")
            .field("host", &self.host)
            .field("slots", &self.slots)
            .field("pending", &self.pending_count())
            .field("timeout", &self.timeout)
            .finish()
    }
}
