//! Fault taxonomy for the relay pipeline
//!
//! Tasks never halt the system themselves. Every failure is returned as a
//! [`Fault`] to the supervisor, which decides whether to halt, restart the
//! task, or isolate it.

use thiserror::Error;

use crate::types::OutputState;

/// Identifies one of the supervised pipeline tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskId {
    /// Button edge -> signal post
    Stimulus,
    /// Signal wait -> toggle -> publish
    Producer,
    /// Channel receive -> mirror output
    Consumer,
}

impl TaskId {
    /// Number of task identities
    pub const COUNT: usize = 3;

    /// Stable index, used for per-task bookkeeping
    pub const fn index(self) -> usize {
        match self {
            TaskId::Stimulus => 0,
            TaskId::Producer => 1,
            TaskId::Consumer => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TaskId::Stimulus => "stimulus",
            TaskId::Producer => "producer",
            TaskId::Consumer => "consumer",
        }
    }
}

/// A finite wait elapsed before the event arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("operation timed out")]
pub struct Timeout;

/// Terminal failure of a pipeline task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// The handoff channel had no free slot; the state was not published
    #[error("handoff channel full, state {state:?} not published")]
    ChannelFull { state: OutputState },
    /// The consumer gave up waiting for a message
    #[error("no message received before the receive timeout")]
    ReceiveTimeout,
    /// Driving or reading back an output pin failed
    #[error("output pin access failed in {} task", .task.name())]
    Output { task: TaskId },
    /// Waiting for the button edge failed
    #[error("button edge wait failed")]
    Input,
}

impl Fault {
    /// Task that reports this kind of fault
    pub const fn origin(&self) -> TaskId {
        match self {
            Fault::ChannelFull { .. } => TaskId::Producer,
            Fault::ReceiveTimeout => TaskId::Consumer,
            Fault::Output { task } => *task,
            Fault::Input => TaskId::Stimulus,
        }
    }
}
