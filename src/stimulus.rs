//! Stimulus source: button edges become signal posts
//!
//! The only thing the stimulus side holds is a [`SignalPoster`], so it can
//! post but never wait. [`StimulusTask::on_edge`] is the whole interrupt
//! body: one critical-section post, no blocking, no allocation. On the
//! RP2040 the GPIO interrupt is owned by the HAL, which wakes
//! [`StimulusTask::cycle`] from its edge wait; a board that routes the
//! pin interrupt by hand can call [`SignalPoster::post`] straight from
//! the handler.
//!
//! Debouncing is left to the input configuration.

use embedded_hal_async::digital::Wait;

use crate::error::{Fault, TaskId};
use crate::signal::SignalPoster;
use crate::supervisor::PipelineTask;

/// Which transition of the button pin counts as a press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// High -> low, button to ground with a pull-up
    #[default]
    Falling,
    Rising,
    Any,
}

pub struct StimulusTask<'a, B> {
    button: B,
    edge: Edge,
    poster: SignalPoster<'a>,
    edges: u32,
}

impl<'a, B> StimulusTask<'a, B>
where
    B: Wait,
{
    pub fn new(button: B, edge: Edge, poster: SignalPoster<'a>) -> Self {
        Self {
            button,
            edge,
            poster,
            edges: 0,
        }
    }

    /// Edges seen so far
    pub fn edges(&self) -> u32 {
        self.edges
    }

    /// Interrupt body: post the signal and return.
    #[inline]
    pub fn on_edge(&mut self) -> bool {
        self.edges = self.edges.wrapping_add(1);
        self.poster.post()
    }

    /// Wait for the next configured edge, then post.
    ///
    /// Returns `false` if the post coalesced into one already pending.
    pub async fn cycle(&mut self) -> Result<bool, Fault> {
        let waited = match self.edge {
            Edge::Falling => self.button.wait_for_falling_edge().await,
            Edge::Rising => self.button.wait_for_rising_edge().await,
            Edge::Any => self.button.wait_for_any_edge().await,
        };
        waited.map_err(|_| Fault::Input)?;

        let counted = self.on_edge();
        if counted {
            debug!("stimulus: edge {}, signal posted", self.edges);
        } else {
            warn!("stimulus: edge {} coalesced into pending signal", self.edges);
        }
        Ok(counted)
    }
}

impl<B> PipelineTask for StimulusTask<'_, B>
where
    B: Wait,
{
    const ID: TaskId = TaskId::Stimulus;

    async fn step(&mut self) -> Result<(), Fault> {
        self.cycle().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    use super::*;
    use crate::signal::BinarySignal;

    /// Delivers `remaining` edges immediately, then fails
    struct Presses {
        remaining: u32,
        last: Option<Edge>,
    }

    impl ErrorType for Presses {
        type Error = ErrorKind;
    }

    impl Presses {
        fn edge(&mut self, edge: Edge) -> Result<(), ErrorKind> {
            self.last = Some(edge);
            if self.remaining == 0 {
                return Err(ErrorKind::Other);
            }
            self.remaining -= 1;
            Ok(())
        }
    }

    impl Wait for Presses {
        async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
            self.edge(Edge::Rising)
        }

        async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
            self.edge(Edge::Falling)
        }

        async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
            self.edge(Edge::Any)
        }
    }

    #[test]
    fn each_edge_posts_once() {
        let signal = BinarySignal::new();
        let button = Presses {
            remaining: 2,
            last: None,
        };
        let mut stimulus = StimulusTask::new(button, Edge::Falling, signal.poster());

        assert_eq!(block_on(stimulus.cycle()), Ok(true));
        assert_eq!(block_on(stimulus.cycle()), Ok(false));
        assert_eq!(stimulus.edges(), 2);
        assert_eq!(stimulus.button.last, Some(Edge::Falling));
        assert_eq!(signal.stats().posts, 2);
        assert_eq!(signal.pending(), 1);
    }

    #[test]
    fn configured_edge_is_the_one_awaited() {
        let signal = BinarySignal::new();
        let button = Presses {
            remaining: 1,
            last: None,
        };
        let mut stimulus = StimulusTask::new(button, Edge::Rising, signal.poster());
        block_on(stimulus.cycle()).unwrap();
        assert_eq!(stimulus.button.last, Some(Edge::Rising));
    }

    #[test]
    fn input_failure_is_reported() {
        let signal = BinarySignal::new();
        let button = Presses {
            remaining: 0,
            last: None,
        };
        let mut stimulus = StimulusTask::new(button, Edge::Falling, signal.poster());
        assert_eq!(block_on(stimulus.cycle()), Err(Fault::Input));
        assert_eq!(signal.pending(), 0);
    }

    #[test]
    fn on_edge_is_usable_without_an_executor() {
        let signal = BinarySignal::new();
        let button = Presses {
            remaining: 0,
            last: None,
        };
        let mut stimulus = StimulusTask::<Presses>::new(button, Edge::Falling, signal.poster());
        assert!(stimulus.on_edge());
        assert!(signal.try_wait());
    }
}
