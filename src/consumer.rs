//! Consumer task
//!
//! Blocks on the handoff channel and writes each received state verbatim
//! to the mirror LED. Nothing is remembered between messages.

use embassy_time::Duration;
use embedded_hal::digital::OutputPin;

use crate::channels::Pipeline;
use crate::config::{ConsumerConfig, LEVEL_CHANNEL_CAP};
use crate::error::{Fault, TaskId};
use crate::handoff::HandoffReceiver;
use crate::supervisor::PipelineTask;
use crate::types::OutputState;

pub struct ConsumerTask<'a, P, const N: usize = LEVEL_CHANNEL_CAP> {
    receiver: HandoffReceiver<'a, OutputState, N>,
    led: P,
    receive_timeout: Option<Duration>,
    applied: u32,
}

impl<'a, P, const N: usize> ConsumerTask<'a, P, N>
where
    P: OutputPin,
{
    pub fn new(pipeline: &'a Pipeline<N>, led: P, config: ConsumerConfig) -> Self {
        Self {
            receiver: pipeline.receiver(),
            led,
            receive_timeout: config.receive_timeout,
            applied: 0,
        }
    }

    /// Number of states written to the mirror LED
    pub fn applied(&self) -> u32 {
        self.applied
    }

    pub fn led_mut(&mut self) -> &mut P {
        &mut self.led
    }

    /// Receive one state and apply it.
    pub async fn cycle(&mut self) -> Result<OutputState, Fault> {
        let state = match self.receive_timeout {
            None => self.receiver.receive().await,
            Some(timeout) => self
                .receiver
                .receive_timeout(timeout)
                .await
                .map_err(|_| Fault::ReceiveTimeout)?,
        };

        self.led
            .set_state(state.into())
            .map_err(|_| Fault::Output {
                task: TaskId::Consumer,
            })?;
        self.applied = self.applied.wrapping_add(1);
        debug!("consumer: mirror LED set {:?}", state);
        Ok(state)
    }
}

impl<P, const N: usize> PipelineTask for ConsumerTask<'_, P, N>
where
    P: OutputPin,
{
    const ID: TaskId = TaskId::Consumer;

    async fn step(&mut self) -> Result<(), Fault> {
        self.cycle().await.map(|_| ())
    }
}
