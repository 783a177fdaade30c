//! The windowing-service side of the selection protocol.
//!
//! [`SelectionClipboard`](super::SelectionClipboard) never talks to a display
//! server directly. It issues requests through a [`SelectionHost`] and is fed
//! the resulting [`SelectionEvent`]s, either by the dispatcher or by draining
//! [`SelectionHost::poll_events`].

use std::collections::{HashMap, VecDeque};

use super::protocol::{
    SelectionEvent, Slot, SurfaceId, Target, TransferChannel, TransferPayload, TransferReady,
    TransferRequest,
};

/// Outbound half of the selection protocol
pub trait SelectionHost {
    /// Surface currently owning `slot`, if any
    fn owner(&self, slot: Slot) -> Option<SurfaceId>;

    /// Claim ownership of `slot` for `surface`
    fn claim(&mut self, slot: Slot, surface: SurfaceId, text: &str);

    /// Explicitly give up ownership so other clients see the slot as unowned
    fn release(&mut self, slot: Slot, surface: SurfaceId);

    /// Ask the owner of `slot` to write `target` into `channel`
    fn convert(
        &mut self,
        requester: SurfaceId,
        slot: Slot,
        target: Target,
        channel: TransferChannel,
    );

    /// Read and delete the payload written into one of our channels
    fn take_payload(
        &mut self,
        requester: SurfaceId,
        channel: TransferChannel,
    ) -> Option<TransferPayload>;

    /// Answer a transfer request: write the payload and acknowledge, or deny
    /// with `None`
    fn respond(&mut self, request: &TransferRequest, payload: Option<TransferPayload>);

    /// Drain events the host has queued for us
    fn poll_events(&mut self) -> Vec<SelectionEvent> {
        Vec::new()
    }
}

/// Record of a message sent to the host, kept by [`HeadlessHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    Claim {
        slot: Slot,
        surface: SurfaceId,
    },
    Release {
        slot: Slot,
        surface: SurfaceId,
    },
    Convert {
        requester: SurfaceId,
        slot: Slot,
        target: Target,
        channel: TransferChannel,
    },
}

/// How a simulated foreign owner answers conversions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignReply {
    /// Write this payload and acknowledge
    Payload(TransferPayload),
    /// Acknowledge with a denial
    Deny,
    /// Never answer
    Silent,
}

/// Answer we gave to a transfer request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostResponse {
    pub request: TransferRequest,
    pub payload: Option<TransferPayload>,
}

/// Channels handed to foreign requesters start here so they never collide
/// with the clipboard's own table indices.
const FOREIGN_CHANNEL_BASE: usize = 1 << 16;

/// In-memory selection service.
///
/// Simulates the display server plus any number of foreign clients, so the
/// whole protocol can be exercised without a display.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    owners: HashMap<Slot, SurfaceId>,
    foreign: HashMap<Slot, ForeignReply>,
    properties: HashMap<(SurfaceId, TransferChannel), TransferPayload>,
    inbox: VecDeque<SelectionEvent>,
    requests: Vec<HostRequest>,
    responses: Vec<HostResponse>,
    next_foreign_channel: usize,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A foreign client claims `slot` and answers conversions with `reply`.
    /// The previous owner is told it lost the slot.
    pub fn foreign_claim(&mut self, slot: Slot, surface: SurfaceId, reply: ForeignReply) {
        if let Some(previous) = self.owners.insert(slot, surface) {
            if previous != surface {
                self.inbox.push_back(SelectionEvent::OwnershipLost {
                    slot,
                    surface: previous,
                });
            }
        }
        self.foreign.insert(slot, reply);
    }

    /// Convenience for a foreign owner that answers with UTF-8 text
    pub fn serve_foreign(&mut self, slot: Slot, surface: SurfaceId, text: &str) {
        self.foreign_claim(slot, surface, ForeignReply::Payload(TransferPayload::utf8(text)));
    }

    /// A foreign client asks the current owner of `slot` for `target`
    pub fn foreign_request(
        &mut self,
        requester: SurfaceId,
        slot: Slot,
        target: Target,
    ) -> Option<TransferChannel> {
        let owner = *self.owners.get(&slot)?;
        let channel = TransferChannel(FOREIGN_CHANNEL_BASE + self.next_foreign_channel);
        self.next_foreign_channel += 1;
        self.inbox
            .push_back(SelectionEvent::TransferRequest(TransferRequest {
                owner,
                requester,
                slot,
                target,
                channel,
            }));
        Some(channel)
    }

    /// Deliver an arbitrary event on the next poll
    pub fn push_event(&mut self, event: SelectionEvent) {
        self.inbox.push_back(event);
    }

    /// Place a payload into a channel, as a foreign owner would
    pub fn put_payload(
        &mut self,
        requester: SurfaceId,
        channel: TransferChannel,
        payload: TransferPayload,
    ) {
        self.properties.insert((requester, channel), payload);
    }

    /// Messages sent to the host so far, oldest first
    pub fn requests(&self) -> &[HostRequest] {
        &self.requests
    }

    pub fn drain_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Answers given to transfer requests so far
    pub fn responses(&self) -> &[HostResponse] {
        &self.responses
    }

    pub fn pending_events(&self) -> usize {
        self.inbox.len()
    }

    fn answer_conversion(
        &mut self,
        requester: SurfaceId,
        slot: Slot,
        target: Target,
        channel: TransferChannel,
    ) {
        let Some(reply) = self.foreign.get(&slot).cloned() else {
            // Owned by one of our surfaces: the owner side answers it
            if let Some(&owner) = self.owners.get(&slot) {
                self.inbox
                    .push_back(SelectionEvent::TransferRequest(TransferRequest {
                        owner,
                        requester,
                        slot,
                        target,
                        channel,
                    }));
            }
            return;
        };
        let channel = match reply {
            ForeignReply::Silent => return,
            ForeignReply::Deny => None,
            ForeignReply::Payload(payload) => {
                self.properties.insert((requester, channel), payload);
                Some(channel)
            }
        };
        self.inbox
            .push_back(SelectionEvent::TransferReady(TransferReady {
                requester,
                slot,
                target,
                channel,
            }));
    }
}

impl SelectionHost for HeadlessHost {
    fn owner(&self, slot: Slot) -> Option<SurfaceId> {
        self.owners.get(&slot).copied()
    }

    fn claim(&mut self, slot: Slot, surface: SurfaceId, _text: &str) {
        self.requests.push(HostRequest::Claim { slot, surface });
        self.foreign.remove(&slot);
        self.owners.insert(slot, surface);
    }

    fn release(&mut self, slot: Slot, surface: SurfaceId) {
        self.requests.push(HostRequest::Release { slot, surface });
        if self.owners.get(&slot) == Some(&surface) {
            self.owners.remove(&slot);
        }
    }

    fn convert(
        &mut self,
        requester: SurfaceId,
        slot: Slot,
        target: Target,
        channel: TransferChannel,
    ) {
        self.requests.push(HostRequest::Convert {
            requester,
            slot,
            target: target.clone(),
            channel,
        });
        self.answer_conversion(requester, slot, target, channel);
    }

    fn take_payload(
        &mut self,
        requester: SurfaceId,
        channel: TransferChannel,
    ) -> Option<TransferPayload> {
        self.properties.remove(&(requester, channel))
    }

    fn respond(&mut self, request: &TransferRequest, payload: Option<TransferPayload>) {
        // Requests routed from our own conversions get their answer delivered
        if request.channel.0 < FOREIGN_CHANNEL_BASE {
            let channel = payload.clone().map(|payload| {
                self.properties
                    .insert((request.requester, request.channel), payload);
                request.channel
            });
            self.inbox
                .push_back(SelectionEvent::TransferReady(TransferReady {
                    requester: request.requester,
                    slot: request.slot,
                    target: request.target.clone(),
                    channel,
                }));
        }
        self.responses.push(HostResponse {
            request: request.clone(),
            payload,
        });
    }

    fn poll_events(&mut self) -> Vec<SelectionEvent> {
        self.inbox.drain(..).collect()
    }
}
