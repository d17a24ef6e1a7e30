//! Common types shared by the relay tasks
//!
//! This module contains the message carried through the handoff channel
//! and the application version information.

use embedded_hal::digital::PinState;

/// Output level published by the producer and mirrored by the consumer
///
/// This is the whole message: it has no identity beyond its value and is
/// copied on send and receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputState {
    /// LED off
    #[default]
    Low,
    /// LED on
    High,
}

impl OutputState {
    pub const fn is_high(self) -> bool {
        matches!(self, OutputState::High)
    }

    /// The opposite level
    pub const fn toggled(self) -> Self {
        match self {
            OutputState::Low => OutputState::High,
            OutputState::High => OutputState::Low,
        }
    }
}

impl From<bool> for OutputState {
    fn from(high: bool) -> Self {
        if high {
            OutputState::High
        } else {
            OutputState::Low
        }
    }
}

impl From<OutputState> for bool {
    fn from(state: OutputState) -> Self {
        state.is_high()
    }
}

impl From<OutputState> for PinState {
    fn from(state: OutputState) -> Self {
        match state {
            OutputState::Low => PinState::Low,
            OutputState::High => PinState::High,
        }
    }
}

/// Application version information
pub struct AppVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl AppVersion {
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self { major, minor, patch }
    }

    pub fn as_string(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

/// Current application version
pub const APP_VERSION: AppVersion = AppVersion::new(0, 1, 0);
