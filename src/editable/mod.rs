//! Single-line text entry engine for the color picker.
//!
//! Every entry (hex, RGB integer, RGB float, HSV/HSL text) is an
//! [`EditSession`] driven by [`EntryMsg`] intents.
//!
//! # Architecture
//!
//! The core components are:
//!
//! - [`TextBuffer`]: UTF-8 storage with byte-offset edit primitives
//! - [`Selection`]: anchor/active pair; the active end is the cursor
//! - [`HistoryStack`]: bounded whole-text undo/redo snapshots
//! - [`ValidationPolicy`]: per-kind character acceptance, length limit and
//!   commit parsing into a [`CanonicalValue`]
//! - [`ValidationFeedback`]: timed valid/invalid flash for the renderer
//! - [`Viewport`]: horizontal scroll kept around the caret
//! - [`EditSession`]: composes the above; one `update` per intent
//!
//! # Example
//!
//! ```
//! use pixelprism::clipboard::{HeadlessHost, SelectionClipboard, SurfaceId};
//! use pixelprism::editable::{EditSession, EntryMsg, ValidationPolicy};
//!
//! let mut clipboard = SelectionClipboard::new(HeadlessHost::new());
//! let mut entry = EditSession::new(SurfaceId(1), ValidationPolicy::hex());
//!
//! for ch in "ff00aa".chars() {
//!     entry.update(EntryMsg::InsertChar(ch), &mut clipboard);
//! }
//! assert_eq!(entry.text(), "#FF00AA");
//! ```

mod buffer;
mod feedback;
mod history;
mod messages;
mod selection;
mod session;
mod validation;
mod viewport;

// Re-export main types
pub use buffer::TextBuffer;
pub use feedback::{
    ValidationFeedback, ValidationState, DEFAULT_INVALID_FLASH, DEFAULT_VALID_FLASH,
};
pub use history::{HistoryStack, DEFAULT_UNDO_DEPTH};
pub use messages::{EntryEvent, EntryMsg, MoveTarget};
pub use selection::Selection;
pub use session::EditSession;
pub use validation::{
    CanonicalValue, EntryKind, HexCase, InvalidValue, ValidationPolicy, HEX_MARKER,
};
pub use viewport::{MonospaceMeasure, TextMeasure, Viewport};
