//! Producer task
//!
//! Waits for the button signal, toggles the source LED, reads the LED back,
//! lets it settle and publishes the read-back level to the consumer.
//!
//! ```text
//! WaitingSignal -> Acting -> Delaying -> Publishing -> WaitingSignal
//! ```
//!
//! The current state is kept in the task, so a cycle that is cancelled at
//! a suspension point (signal wait, settle delay, blocking send) resumes
//! where it left off on the next call to [`ProducerTask::cycle`].

use embassy_time::{Duration, Timer};
use embedded_hal::digital::StatefulOutputPin;

use crate::channels::Pipeline;
use crate::config::{ProducerConfig, LEVEL_CHANNEL_CAP};
use crate::error::{Fault, TaskId};
use crate::handoff::HandoffSender;
use crate::signal::BinarySignal;
use crate::supervisor::PipelineTask;
use crate::types::OutputState;

/// What to do when the handoff channel is full at publish time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendPolicy {
    /// One non-blocking attempt; a full channel is a fault
    Strict,
    /// Up to `attempts` extra non-blocking attempts, `backoff` apart
    Retry { attempts: u8, backoff: Duration },
    /// Suspend until the consumer frees a slot
    Block,
}

/// Producer state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProducerState {
    WaitingSignal,
    Acting,
    Delaying(OutputState),
    Publishing(OutputState),
}

/// Signal-gated toggle-and-publish task
pub struct ProducerTask<'a, P, const N: usize = LEVEL_CHANNEL_CAP> {
    signal: &'a BinarySignal,
    sender: HandoffSender<'a, OutputState, N>,
    led: P,
    config: ProducerConfig,
    state: ProducerState,
    published: u32,
}

impl<'a, P, const N: usize> ProducerTask<'a, P, N>
where
    P: StatefulOutputPin,
{
    pub fn new(pipeline: &'a Pipeline<N>, led: P, config: ProducerConfig) -> Self {
        Self {
            signal: &pipeline.signal,
            sender: pipeline.sender(),
            led,
            config,
            state: ProducerState::WaitingSignal,
            published: 0,
        }
    }

    pub fn state(&self) -> ProducerState {
        self.state
    }

    /// Number of states successfully handed to the consumer
    pub fn published(&self) -> u32 {
        self.published
    }

    pub fn led_mut(&mut self) -> &mut P {
        &mut self.led
    }

    /// Run one full cycle and return the published state.
    pub async fn cycle(&mut self) -> Result<OutputState, Fault> {
        loop {
            match self.state {
                ProducerState::WaitingSignal => {
                    self.signal.wait().await;
                    debug!("producer: signal taken");
                    self.state = ProducerState::Acting;
                }
                ProducerState::Acting => {
                    let state = self.toggle_and_read_back()?;
                    debug!("producer: source LED now {:?}", state);
                    self.state = ProducerState::Delaying(state);
                }
                ProducerState::Delaying(state) => {
                    Timer::after(self.config.settle_delay).await;
                    self.state = ProducerState::Publishing(state);
                }
                ProducerState::Publishing(state) => {
                    self.publish(state).await?;
                    self.published = self.published.wrapping_add(1);
                    self.state = ProducerState::WaitingSignal;
                    debug!("producer: published {:?}", state);
                    return Ok(state);
                }
            }
        }
    }

    /// Toggle the source LED and read the level it actually ended up at.
    fn toggle_and_read_back(&mut self) -> Result<OutputState, Fault> {
        let output_fault = |_| Fault::Output {
            task: TaskId::Producer,
        };
        self.led.toggle().map_err(output_fault)?;
        let high = self.led.is_set_high().map_err(output_fault)?;
        Ok(OutputState::from(high))
    }

    async fn publish(&mut self, state: OutputState) -> Result<(), Fault> {
        match self.config.send_policy {
            SendPolicy::Strict => self
                .sender
                .try_send(state)
                .map_err(|_| Fault::ChannelFull { state }),
            SendPolicy::Retry { attempts, backoff } => {
                for retry in 0..=attempts {
                    if self.sender.try_send(state).is_ok() {
                        return Ok(());
                    }
                    if retry < attempts {
                        warn!("producer: channel full, retry {} of {}", retry + 1, attempts);
                        Timer::after(backoff).await;
                    }
                }
                Err(Fault::ChannelFull { state })
            }
            SendPolicy::Block => {
                self.sender.send(state).await;
                Ok(())
            }
        }
    }
}

impl<P, const N: usize> PipelineTask for ProducerTask<'_, P, N>
where
    P: StatefulOutputPin,
{
    const ID: TaskId = TaskId::Producer;

    async fn step(&mut self) -> Result<(), Fault> {
        self.cycle().await.map(|_| ())
    }

    /// Drop any half-finished cycle; the unpublished state is lost.
    fn reset(&mut self) {
        self.state = ProducerState::WaitingSignal;
    }
}
