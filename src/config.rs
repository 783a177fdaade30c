//! Entry configuration persistence
//!
//! Stores user preferences in `~/.config/pixelprism/config.yaml`

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::clipboard::{SelectionClipboard, SelectionHost, SurfaceId, MAX_PENDING_REQUESTS};
use crate::editable::{
    EditSession, EntryKind, HexCase, ValidationPolicy, DEFAULT_INVALID_FLASH,
    DEFAULT_UNDO_DEPTH, DEFAULT_VALID_FLASH,
};

/// Per-kind input length limits in bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxLengthConfig {
    pub text: usize,
    pub integer: usize,
    pub float: usize,
    pub hex: usize,
}

impl Default for MaxLengthConfig {
    fn default() -> Self {
        Self {
            text: 64,
            integer: 16,
            float: 32,
            hex: 7,
        }
    }
}

impl MaxLengthConfig {
    pub fn for_kind(&self, kind: EntryKind) -> usize {
        match kind {
            EntryKind::Text => self.text,
            EntryKind::Integer => self.integer,
            EntryKind::Float => self.float,
            EntryKind::Hex => self.hex,
        }
    }
}

/// Validation flash durations in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    pub invalid_ms: u64,
    pub valid_ms: u64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            invalid_ms: DEFAULT_INVALID_FLASH.as_millis() as u64,
            valid_ms: DEFAULT_VALID_FLASH.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Capacity of the pending paste table
    pub max_pending: usize,
    /// Give up on a paste after this long (None = wait for an answer)
    pub request_timeout_ms: Option<u64>,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            max_pending: MAX_PENDING_REQUESTS,
            request_timeout_ms: None,
        }
    }
}

/// Text entry configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    pub undo_depth: usize,
    pub hex_uppercase: bool,
    /// Insert `#` when typing into an empty hex entry
    pub hex_prefix: bool,
    /// Mirror selections into the primary slot
    pub auto_copy_primary: bool,
    pub max_length: MaxLengthConfig,
    pub flash: FlashConfig,
    pub clipboard: ClipboardConfig,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            undo_depth: DEFAULT_UNDO_DEPTH,
            hex_uppercase: true,
            hex_prefix: true,
            auto_copy_primary: true,
            max_length: MaxLengthConfig::default(),
            flash: FlashConfig::default(),
            clipboard: ClipboardConfig::default(),
        }
    }
}

impl EntryConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        let path = crate::config_paths::config_file()
            .context("No config directory available")?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn hex_case(&self) -> HexCase {
        if self.hex_uppercase {
            HexCase::Upper
        } else {
            HexCase::Lower
        }
    }

    /// Validation rules for a plain entry of `kind`
    pub fn policy(&self, kind: EntryKind) -> ValidationPolicy {
        let base = match kind {
            EntryKind::Text => ValidationPolicy::text(),
            EntryKind::Integer => ValidationPolicy::integer(),
            EntryKind::Float => ValidationPolicy::float(),
            EntryKind::Hex => ValidationPolicy::hex(),
        };
        self.apply(base)
    }

    /// Apply the configured limits and hex formatting to a policy preset
    pub fn apply(&self, policy: ValidationPolicy) -> ValidationPolicy {
        let max_length = self.max_length.for_kind(policy.kind);
        policy
            .with_max_length((max_length > 0).then_some(max_length))
            .with_hex_case(self.hex_case())
            .with_hex_prefix(self.hex_prefix)
    }

    /// A new entry configured from this file
    pub fn session(&self, surface: SurfaceId, policy: ValidationPolicy) -> EditSession {
        EditSession::new(surface, self.apply(policy))
            .with_undo_depth(self.undo_depth)
            .with_flash(
                Duration::from_millis(self.flash.invalid_ms),
                Duration::from_millis(self.flash.valid_ms),
            )
            .with_auto_copy_primary(self.auto_copy_primary)
    }

    /// A clipboard sized and timed from this file
    pub fn clipboard<H: SelectionHost>(&self, host: H) -> SelectionClipboard<H> {
        SelectionClipboard::with_capacity(host, self.clipboard.max_pending)
            .with_timeout(self.clipboard.request_timeout_ms.map(Duration::from_millis))
    }
}
