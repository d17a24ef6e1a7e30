//! Mock board pins shared by the scenario tests
#![allow(dead_code)]

use core::convert::Infallible;
use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use embedded_hal_async::digital::Wait;
use ledrelay::handoff::HandoffChannel;

/// LED whose level stays observable after the pin is moved into a task
#[derive(Clone, Default)]
pub struct MockLed {
    level: Rc<Cell<bool>>,
    writes: Rc<Cell<u32>>,
}

impl MockLed {
    pub fn low() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.level.get()
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    fn set(&mut self, high: bool) {
        self.level.set(high);
        self.writes.set(self.writes.get() + 1);
    }
}

impl ErrorType for MockLed {
    type Error = Infallible;
}

impl OutputPin for MockLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

impl StatefulOutputPin for MockLed {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level.get())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level.get())
    }
}

/// Edge queue a test pushes presses into
pub type Presses = HandoffChannel<(), 8>;

/// Button that reports one edge per queued press
pub struct MockButton<'a> {
    presses: &'a Presses,
}

impl<'a> MockButton<'a> {
    pub fn new(presses: &'a Presses) -> Self {
        Self { presses }
    }
}

impl ErrorType for MockButton<'_> {
    type Error = Infallible;
}

impl Wait for MockButton<'_> {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        self.presses.receive().await;
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.presses.receive().await;
        Ok(())
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        self.presses.receive().await;
        Ok(())
    }
}
