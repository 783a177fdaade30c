//! Wire-level vocabulary shared by the selection clipboard and its host.

use serde::Serialize;

/// Identity of a surface (window) that can own a slot or request a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SurfaceId(pub u64);

/// One of the two named clipboard channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Slot {
    /// Select-to-copy, middle-click-to-paste
    Primary,
    /// Explicit Ctrl+C / Ctrl+V clipboard
    Clipboard,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Primary, Slot::Clipboard];

    pub(crate) fn index(self) -> usize {
        match self {
            Slot::Primary => 0,
            Slot::Clipboard => 1,
        }
    }
}

/// Representation identifier for a transfer (a "target")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Target {
    /// Query for the list of supported targets
    Targets,
    /// UTF-8 text
    Utf8String,
    /// Latin-1 text
    String,
    /// Marker type of an incremental (oversized) transfer
    Incremental,
    /// Anything this engine does not understand
    Other(String),
}

impl Target {
    /// Plain-text representations this engine reads and writes
    pub fn is_text(&self) -> bool {
        matches!(self, Target::Utf8String | Target::String)
    }
}

/// Targets answered by an owner, in preference order
pub const SUPPORTED_TARGETS: [Target; 3] = [Target::Targets, Target::Utf8String, Target::String];

/// Conduit a payload is written into during a paste. One per pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TransferChannel(pub usize);

/// Data written into a transfer channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPayload {
    /// Raw bytes tagged with their representation
    Data { target: Target, bytes: Vec<u8> },
    /// Answer to a [`Target::Targets`] query
    TargetList(Vec<Target>),
}

impl TransferPayload {
    pub fn utf8(text: &str) -> Self {
        TransferPayload::Data {
            target: Target::Utf8String,
            bytes: text.as_bytes().to_vec(),
        }
    }

    /// Encode `text` as Latin-1, replacing unrepresentable characters with '?'
    pub fn latin1(text: &str) -> Self {
        let bytes = text
            .chars()
            .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
            .collect();
        TransferPayload::Data {
            target: Target::String,
            bytes,
        }
    }

    /// Decode a text payload. None for lists and non-text representations.
    pub fn decode_text(&self) -> Option<String> {
        match self {
            TransferPayload::Data {
                target: Target::Utf8String,
                bytes,
            } => Some(String::from_utf8_lossy(bytes).into_owned()),
            TransferPayload::Data {
                target: Target::String,
                bytes,
            } => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&Target> {
        match self {
            TransferPayload::Data { target, .. } => Some(target),
            TransferPayload::TargetList(_) => None,
        }
    }
}

/// Someone asks the owner of `slot` for its contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Surface the host believes owns the slot
    pub owner: SurfaceId,
    pub requester: SurfaceId,
    pub slot: Slot,
    pub target: Target,
    pub channel: TransferChannel,
}

/// Answer to one of our conversion requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReady {
    pub requester: SurfaceId,
    pub slot: Slot,
    pub target: Target,
    /// None means the owner denied the request
    pub channel: Option<TransferChannel>,
}

/// Events the host delivers to the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    TransferRequest(TransferRequest),
    TransferReady(TransferReady),
    /// Another client claimed the slot
    OwnershipLost { slot: Slot, surface: SurfaceId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_round_trip_replaces_wide_chars() {
        let payload = TransferPayload::latin1("café ✓");
        assert_eq!(payload.decode_text().as_deref(), Some("café ?"));
    }

    #[test]
    fn test_decode_rejects_non_text() {
        let other = TransferPayload::Data {
            target: Target::Other("image/png".to_string()),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(other.decode_text(), None);
        assert_eq!(TransferPayload::TargetList(vec![]).decode_text(), None);
    }

    #[test]
    fn test_slot_indices_distinct() {
        assert_ne!(Slot::Primary.index(), Slot::Clipboard.index());
    }
}
