//! Timed validation feedback (the valid/invalid border flash).

use serde::Serialize;
use std::time::{Duration, Instant};

/// How long the invalid flash stays up
pub const DEFAULT_INVALID_FLASH: Duration = Duration::from_millis(150);
/// How long the valid flash stays up
pub const DEFAULT_VALID_FLASH: Duration = Duration::from_millis(500);

/// Visual validation state exposed to the renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ValidationState {
    #[default]
    Normal,
    FlashInvalid,
    FlashValid,
}

/// Flash state machine: Normal -> Flash* -> Normal after the flash duration.
#[derive(Debug, Clone)]
pub struct ValidationFeedback {
    state: ValidationState,
    since: Option<Instant>,
    invalid_for: Duration,
    valid_for: Duration,
}

impl Default for ValidationFeedback {
    fn default() -> Self {
        Self::new(DEFAULT_INVALID_FLASH, DEFAULT_VALID_FLASH)
    }
}

impl ValidationFeedback {
    pub fn new(invalid_for: Duration, valid_for: Duration) -> Self {
        Self {
            state: ValidationState::Normal,
            since: None,
            invalid_for,
            valid_for,
        }
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    pub fn flash_invalid(&mut self, now: Instant) {
        self.state = ValidationState::FlashInvalid;
        self.since = Some(now);
    }

    pub fn flash_valid(&mut self, now: Instant) {
        self.state = ValidationState::FlashValid;
        self.since = Some(now);
    }

    /// Expire a running flash. Returns true when the state went back to Normal.
    pub fn tick(&mut self, now: Instant) -> bool {
        let duration = match self.state {
            ValidationState::Normal => return false,
            ValidationState::FlashInvalid => self.invalid_for,
            ValidationState::FlashValid => self.valid_for,
        };
        let Some(since) = self.since else {
            return false;
        };
        if now.saturating_duration_since(since) >= duration {
            self.state = ValidationState::Normal;
            self.since = None;
            true
        } else {
            false
        }
    }
}
