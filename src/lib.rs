//! pixelprism - text entry engine for color pickers
//!
//! This crate provides editable entries that validate as the user types,
//! a selection clipboard with X11-style asynchronous transfers, and the
//! focus bookkeeping that ties entries in one window together.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod config_paths;
pub mod editable;
pub mod focus;
pub mod tracing;
pub mod util;

// Re-export commonly used types
pub use clipboard::{HeadlessHost, SelectionClipboard, SelectionHost, Slot, SurfaceId};
pub use config::EntryConfig;
pub use editable::{EditSession, EntryEvent, EntryMsg, ValidationPolicy};
pub use focus::{EntryId, FocusManager};
