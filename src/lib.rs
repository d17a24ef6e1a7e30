//! LedRelay - button-triggered LED relay for RP2040
//!
//! A fixed two-stage pipeline driven by a hardware event:
//!
//! ```text
//! button edge --post--> BinarySignal --wait--> producer --try_send--> HandoffChannel --receive--> consumer
//! (interrupt)                                  toggle LED A                                     write LED B
//!                                              settle 1 s
//! ```
//!
//! ## Architecture
//! - **Primitives**: [`signal::BinarySignal`] (saturating event counter) and
//!   [`handoff::HandoffChannel`] (bounded FIFO, single slot by default)
//! - **Capabilities**: the interrupt side only ever holds a
//!   [`signal::SignalPoster`], which cannot block
//! - **Supervision**: tasks return [`error::Fault`]s to the
//!   [`supervisor::AppSupervisor`], which halts, restarts or isolates
//! - **Async**: Embassy framework; the protocol core is hardware independent
//!   and runs on any `critical-section` implementation

#![cfg_attr(not(test), no_std)]

// This must go first so the macros are visible to the other modules
mod fmt;

pub mod channels;
pub mod config;
pub mod consumer;
pub mod error;
pub mod handoff;
pub mod producer;
pub mod signal;
pub mod stimulus;
pub mod supervisor;
pub mod types;

#[cfg(feature = "rp2040")]
pub mod hardware;
