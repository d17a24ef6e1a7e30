//! Hardware and pipeline configuration for LedRelay
//! RP2040-based button-to-LED relay

use embassy_time::Duration;

use crate::producer::SendPolicy;
use crate::signal::SignalMode;
use crate::supervisor::FaultPolicy;
use crate::types::OutputState;

// ===================================================================
// GPIO Pin Assignments - Raspberry Pi Pico
// ===================================================================

pub const BUTTON_PIN: u8 = 2; // Push button to GND, internal pull-up, falling edge
pub const LED_SOURCE_PIN: u8 = 15; // Toggled by the producer ("red")
pub const LED_MIRROR_PIN: u8 = 14; // Written by the consumer ("green")
pub const LED_STATUS_PIN: u8 = 25; // Built-in LED on Pico

// Both relay LEDs start off
pub const INITIAL_OUTPUT: OutputState = OutputState::Low;

// ===================================================================
// Pipeline Configuration
// ===================================================================

pub const SETTLE_DELAY_MS: u64 = 1000; // Producer delay between toggle and publish
pub const LEVEL_CHANNEL_CAP: usize = 1; // Handoff slots
pub const SIGNAL_MODE: SignalMode = SignalMode::Binary; // Button bursts coalesce
pub const SEND_POLICY: SendPolicy = SendPolicy::Strict; // Full channel is a fault

// ===================================================================
// Supervision
// ===================================================================

pub const FAULT_POLICY: FaultPolicy = FaultPolicy::Halt;
pub const MAX_TASK_RESTARTS: u32 = 3; // Per task, before escalating to halt
pub const STATUS_TICK_SECS: u64 = 10; // Supervisor wake-up period
pub const STATUS_REPORT_SECS: u32 = 60; // Status log period

// ===================================================================
// Runtime configuration
// ===================================================================

/// Producer task settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerConfig {
    /// Delay between reading back the toggled output and publishing it
    pub settle_delay: Duration,
    pub send_policy: SendPolicy,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(SETTLE_DELAY_MS),
            send_policy: SEND_POLICY,
        }
    }
}

/// Consumer task settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsumerConfig {
    /// `None` waits forever
    pub receive_timeout: Option<Duration>,
}

/// Supervisor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    pub policy: FaultPolicy,
    /// Restarts allowed per task under [`FaultPolicy::RestartTask`]
    pub max_restarts: u32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            policy: FAULT_POLICY,
            max_restarts: MAX_TASK_RESTARTS,
        }
    }
}
