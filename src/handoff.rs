//! Bounded handoff channel between the producer and consumer tasks
//!
//! A FIFO of fixed-size messages built on `embassy_sync::channel::Channel`.
//! The capacity is a const parameter that defaults to a single slot.
//! `try_send` never blocks and never overwrites: on a full buffer the
//! message comes back to the caller in [`TrySendError::Full`] and the
//! buffered contents are left untouched.
//!
//! The channel also counts every message accepted and every message
//! delivered, so `sent - received` is always the number still buffered.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{with_timeout, Duration};
use portable_atomic::{AtomicU32, Ordering};

use crate::error::Timeout;

pub use embassy_sync::channel::TrySendError;

/// Message counters of a handoff channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandoffStats {
    pub sent: u32,
    pub received: u32,
}

impl HandoffStats {
    /// Messages accepted but not yet delivered
    pub fn in_flight(&self) -> u32 {
        self.sent.wrapping_sub(self.received)
    }
}

/// Bounded FIFO channel with capacity `N`
pub struct HandoffChannel<T, const N: usize = 1> {
    inner: Channel<CriticalSectionRawMutex, T, N>,
    sent: AtomicU32,
    received: AtomicU32,
}

impl<T, const N: usize> HandoffChannel<T, N> {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
            sent: AtomicU32::new(0),
            received: AtomicU32::new(0),
        }
    }

    /// Enqueue `msg` if there is room; fails immediately otherwise.
    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        self.inner.try_send(msg)?;
        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Enqueue `msg`, suspending while the buffer is full.
    pub async fn send(&self, msg: T) {
        self.inner.send(msg).await;
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Dequeue the oldest message, suspending while the buffer is empty.
    ///
    /// Dropping the future before it completes dequeues nothing.
    pub async fn receive(&self) -> T {
        let msg = self.inner.receive().await;
        self.received.fetch_add(1, Ordering::Relaxed);
        msg
    }

    /// Like [`receive`](Self::receive), but gives up after `timeout`.
    pub async fn receive_timeout(&self, timeout: Duration) -> Result<T, Timeout> {
        with_timeout(timeout, self.receive())
            .await
            .map_err(|_| Timeout)
    }

    pub fn try_receive(&self) -> Option<T> {
        let msg = self.inner.try_receive().ok()?;
        self.received.fetch_add(1, Ordering::Relaxed);
        Some(msg)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn stats(&self) -> HandoffStats {
        HandoffStats {
            sent: self.sent.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
        }
    }

    /// Send-only handle for the producing side
    pub fn sender(&self) -> HandoffSender<'_, T, N> {
        HandoffSender { channel: self }
    }

    /// Receive-only handle for the consuming side
    pub fn receiver(&self) -> HandoffReceiver<'_, T, N> {
        HandoffReceiver { channel: self }
    }
}

impl<T, const N: usize> Default for HandoffChannel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Send-only view of a [`HandoffChannel`]
pub struct HandoffSender<'a, T, const N: usize = 1> {
    channel: &'a HandoffChannel<T, N>,
}

impl<T, const N: usize> Clone for HandoffSender<'_, T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize> Copy for HandoffSender<'_, T, N> {}

impl<T, const N: usize> HandoffSender<'_, T, N> {
    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        self.channel.try_send(msg)
    }

    pub async fn send(&self, msg: T) {
        self.channel.send(msg).await
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }
}

/// Receive-only view of a [`HandoffChannel`]
pub struct HandoffReceiver<'a, T, const N: usize = 1> {
    channel: &'a HandoffChannel<T, N>,
}

impl<T, const N: usize> Clone for HandoffReceiver<'_, T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize> Copy for HandoffReceiver<'_, T, N> {}

impl<T, const N: usize> HandoffReceiver<'_, T, N> {
    pub async fn receive(&self) -> T {
        self.channel.receive().await
    }

    pub async fn receive_timeout(&self, timeout: Duration) -> Result<T, Timeout> {
        self.channel.receive_timeout(timeout).await
    }

    pub fn try_receive(&self) -> Option<T> {
        self.channel.try_receive()
    }
}
