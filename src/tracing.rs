//! Tracing infrastructure for development diagnostics
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=pixelprism::clipboard=debug` - selection protocol only
//! - `RUST_LOG=pixelprism::editable=debug` - entry intents and commits
//!
//! # Log Files
//!
//! Logs are written to `~/.config/pixelprism/logs/pixelprism.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::editable::{CanonicalValue, EditSession, ValidationState};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`).
/// File logging writes to `~/.config/pixelprism/logs/pixelprism.log` with daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer - respects RUST_LOG
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "pixelprism.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of entry state for diffing and reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySnapshot {
    pub text: String,
    pub cursor: usize,
    pub selection: (usize, usize),
    pub state: ValidationState,
    pub committed: Option<CanonicalValue>,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl EntrySnapshot {
    pub fn from_session(session: &EditSession) -> Self {
        let selection = session.selection();
        Self {
            text: session.text().to_string(),
            cursor: session.cursor(),
            selection: (selection.anchor, selection.active),
            state: session.validation_state(),
            committed: session.committed_value().cloned(),
            can_undo: session.can_undo(),
            can_redo: session.can_redo(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &EntrySnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.text != other.text {
            changes.push(format!("text: {:?} → {:?}", self.text, other.text));
        }
        if self.cursor != other.cursor {
            changes.push(format!("cursor: {} → {}", self.cursor, other.cursor));
        }
        if self.selection != other.selection {
            changes.push(format!(
                "selection: {:?} → {:?}",
                self.selection, other.selection
            ));
        }
        if self.state != other.state {
            changes.push(format!("state: {:?} → {:?}", self.state, other.state));
        }
        if self.committed != other.committed {
            changes.push(format!("committed: {:?}", other.committed));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
