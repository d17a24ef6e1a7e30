//! Binary signal between the button interrupt and the producer task
//!
//! A saturating event counter. `post` is callable from any context,
//! including interrupt handlers: it takes a short critical section, never
//! blocks and never allocates. `wait` is `async` and can only be awaited
//! from task context.
//!
//! In [`SignalMode::Binary`] the pending count clamps at 1, so a burst of
//! posts that arrives before the waiter runs collapses into a single wake.
//! The surplus posts are counted in [`SignalStats::coalesced`].
//! [`SignalMode::Counting`] keeps up to `max` posts pending instead.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::{Context, Poll};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::WakerRegistration;
use embassy_time::{with_timeout, Duration};

use crate::error::Timeout;

/// How many unconsumed posts a signal may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalMode {
    /// At most one pending post; bursts coalesce
    Binary,
    /// Up to `max` pending posts; bursts queue
    Counting { max: u32 },
}

impl SignalMode {
    /// Saturation limit of the pending count
    pub const fn max_pending(self) -> u32 {
        match self {
            SignalMode::Binary => 1,
            SignalMode::Counting { max: 0 } => 1,
            SignalMode::Counting { max } => max,
        }
    }
}

/// Lifetime counters of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalStats {
    /// Every `post` call
    pub posts: u32,
    /// Posts absorbed because the pending count was saturated
    pub coalesced: u32,
}

struct State {
    pending: u32,
    stats: SignalStats,
    waiter: WakerRegistration,
}

/// Event signal with a saturating pending count
pub struct BinarySignal {
    mode: SignalMode,
    state: Mutex<CriticalSectionRawMutex, RefCell<State>>,
}

impl BinarySignal {
    /// Strictly binary signal with nothing pending
    pub const fn new() -> Self {
        Self::with_mode(SignalMode::Binary)
    }

    pub const fn with_mode(mode: SignalMode) -> Self {
        Self {
            mode,
            state: Mutex::new(RefCell::new(State {
                pending: 0,
                stats: SignalStats {
                    posts: 0,
                    coalesced: 0,
                },
                waiter: WakerRegistration::new(),
            })),
        }
    }

    pub fn mode(&self) -> SignalMode {
        self.mode
    }

    /// Record one event and wake the waiting task, if any.
    ///
    /// Returns `false` when the post was absorbed by an already saturated
    /// pending count.
    pub fn post(&self) -> bool {
        let max = self.mode.max_pending();
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.stats.posts = s.stats.posts.wrapping_add(1);
            let counted = if s.pending < max {
                s.pending += 1;
                true
            } else {
                s.stats.coalesced = s.stats.coalesced.wrapping_add(1);
                false
            };
            s.waiter.wake();
            counted
        })
    }

    /// Consume one pending post without suspending.
    pub fn try_wait(&self) -> bool {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if s.pending > 0 {
                s.pending -= 1;
                true
            } else {
                false
            }
        })
    }

    /// Suspend until a post is available, then consume it.
    ///
    /// Dropping the future before it completes consumes nothing.
    pub async fn wait(&self) {
        poll_fn(|cx| self.poll_wait(cx)).await
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout`.
    pub async fn wait_timeout(&self, timeout: Duration) -> Result<(), Timeout> {
        with_timeout(timeout, self.wait()).await.map_err(|_| Timeout)
    }

    /// Number of posts not yet consumed
    pub fn pending(&self) -> u32 {
        self.state.lock(|s| s.borrow().pending)
    }

    pub fn stats(&self) -> SignalStats {
        self.state.lock(|s| s.borrow().stats)
    }

    /// Interrupt-side handle: can post, cannot wait
    pub fn poster(&self) -> SignalPoster<'_> {
        SignalPoster { signal: self }
    }

    fn poll_wait(&self, cx: &mut Context<'_>) -> Poll<()> {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if s.pending > 0 {
                s.pending -= 1;
                Poll::Ready(())
            } else {
                s.waiter.register(cx.waker());
                Poll::Pending
            }
        })
    }
}

impl Default for BinarySignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Post-only view of a [`BinarySignal`]
///
/// This is the capability handed to interrupt handlers and the stimulus
/// task. It has no way to block.
#[derive(Clone, Copy)]
pub struct SignalPoster<'a> {
    signal: &'a BinarySignal,
}

impl SignalPoster<'_> {
    /// See [`BinarySignal::post`]
    #[inline]
    pub fn post(&self) -> bool {
        self.signal.post()
    }
}
