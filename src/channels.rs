//! Inter-task communication primitives
//!
//! The [`Pipeline`] bundles the two synchronization objects of the relay:
//! the button signal and the state handoff channel. It is created once at
//! startup (in a `StaticCell` on target) and lives for the rest of the
//! program. Each task is handed only the capability it needs.

use crate::config::LEVEL_CHANNEL_CAP;
use crate::handoff::{HandoffChannel, HandoffReceiver, HandoffSender, HandoffStats};
use crate::signal::{BinarySignal, SignalMode, SignalPoster, SignalStats};
use crate::types::OutputState;

/// Button signal + output-state channel
pub struct Pipeline<const N: usize = LEVEL_CHANNEL_CAP> {
    /// Stimulus -> producer
    pub signal: BinarySignal,
    /// Producer -> consumer
    pub states: HandoffChannel<OutputState, N>,
}

impl<const N: usize> Pipeline<N> {
    pub const fn new(mode: SignalMode) -> Self {
        Self {
            signal: BinarySignal::with_mode(mode),
            states: HandoffChannel::new(),
        }
    }

    /// Capability for the interrupt side
    pub fn poster(&self) -> SignalPoster<'_> {
        self.signal.poster()
    }

    pub fn sender(&self) -> HandoffSender<'_, OutputState, N> {
        self.states.sender()
    }

    pub fn receiver(&self) -> HandoffReceiver<'_, OutputState, N> {
        self.states.receiver()
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            signal: self.signal.stats(),
            handoff: self.states.stats(),
        }
    }
}

/// Snapshot of all pipeline counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineStats {
    pub signal: SignalStats,
    pub handoff: HandoffStats,
}
