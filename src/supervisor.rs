//! Application supervisor and monitoring
//!
//! Pipeline tasks never stop the system on their own: they return a
//! [`Fault`] and the supervisor applies the configured [`FaultPolicy`].
//! It also owns per-task stop requests and the periodic status report.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use portable_atomic::{AtomicU32, Ordering};

use crate::channels::{Pipeline, PipelineStats};
use crate::config::{self, SupervisorConfig, LEVEL_CHANNEL_CAP};
use crate::error::{Fault, TaskId};
use crate::types::APP_VERSION;

/// A unit of work the supervisor can drive, restart and stop
#[allow(async_fn_in_trait)]
pub trait PipelineTask {
    const ID: TaskId;

    /// One iteration of the task loop
    async fn step(&mut self) -> Result<(), Fault>;

    /// Return to the initial state after a fault
    fn reset(&mut self) {}
}

/// System-wide reaction to a task fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultPolicy {
    /// Any fault halts the whole system
    Halt,
    /// Reset the faulting task and keep going, up to `max_restarts`
    RestartTask,
    /// Park the faulting task; the others keep running
    IsolateTask,
}

/// Decision for a single fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    Halt,
    Restart,
    Isolate,
}

/// Why a supervised task stopped running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// The system must halt
    Halted(Fault),
    /// Only this task is parked
    Isolated(Fault),
    /// A stop was requested
    Stopped,
}

/// Counters reported by the status heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SupervisorStatus {
    pub uptime_seconds: u32,
    pub faults: u32,
    pub restarts: [u32; TaskId::COUNT],
    pub pipeline: PipelineStats,
}

/// Application supervisor responsible for fault handling and monitoring
pub struct AppSupervisor<'a, const N: usize = LEVEL_CHANNEL_CAP> {
    config: SupervisorConfig,
    pipeline: &'a Pipeline<N>,
    faults: AtomicU32,
    restarts: [AtomicU32; TaskId::COUNT],
    stops: [Signal<CriticalSectionRawMutex, ()>; TaskId::COUNT],
    uptime_seconds: AtomicU32,
    last_report: AtomicU32,
}

impl<'a, const N: usize> AppSupervisor<'a, N> {
    pub fn new(pipeline: &'a Pipeline<N>, config: SupervisorConfig) -> Self {
        Self {
            config,
            pipeline,
            faults: AtomicU32::new(0),
            restarts: [AtomicU32::new(0), AtomicU32::new(0), AtomicU32::new(0)],
            stops: [Signal::new(), Signal::new(), Signal::new()],
            uptime_seconds: AtomicU32::new(0),
            last_report: AtomicU32::new(0),
        }
    }

    pub fn policy(&self) -> FaultPolicy {
        self.config.policy
    }

    /// Print application startup banner with wiring and policies
    pub fn print_startup_banner(&self) {
        info!("========================================");
        info!("LedRelay v{}", APP_VERSION.as_string());
        info!("Button -> signal -> producer -> channel -> consumer");
        info!("========================================");
        info!("Hardware: RP2040 (Raspberry Pi Pico)");
        info!(
            "Button: GPIO{} (falling edge), source LED: GPIO{}, mirror LED: GPIO{}",
            config::BUTTON_PIN,
            config::LED_SOURCE_PIN,
            config::LED_MIRROR_PIN
        );
        info!(
            "Signal: {:?}, channel capacity: {}",
            self.pipeline.signal.mode(),
            self.pipeline.states.capacity()
        );
        info!(
            "Fault policy: {:?} (max {} restarts per task)",
            self.config.policy,
            self.config.max_restarts
        );
        info!("========================================");
    }

    /// Print successful initialization message
    pub fn print_init_success(&self) {
        info!("LedRelay initialized successfully");
        info!("Waiting for button presses...");
    }

    /// Decide what a fault reported by `task` means for the system.
    pub fn decide(&self, task: TaskId, fault: Fault) -> Action {
        self.faults.fetch_add(1, Ordering::Relaxed);
        error!("{} task fault: {:?}", task.name(), fault);

        let action = match self.config.policy {
            FaultPolicy::Halt => Action::Halt,
            FaultPolicy::IsolateTask => Action::Isolate,
            FaultPolicy::RestartTask => {
                let used = &self.restarts[task.index()];
                let count = used.load(Ordering::Relaxed);
                if count >= self.config.max_restarts {
                    error!(
                        "{} task exhausted {} restarts, escalating",
                        task.name(),
                        count
                    );
                    Action::Halt
                } else {
                    used.store(count + 1, Ordering::Relaxed);
                    Action::Restart
                }
            }
        };

        match action {
            Action::Halt => error!("halting system"),
            Action::Restart => warn!("restarting {} task", task.name()),
            Action::Isolate => warn!("isolating {} task", task.name()),
        }
        action
    }

    /// Drive `task` until it halts, is isolated, or is asked to stop.
    pub async fn run<T: PipelineTask>(&self, task: &mut T) -> Outcome {
        let stop = &self.stops[T::ID.index()];
        info!("{} task started", T::ID.name());

        loop {
            match select(task.step(), stop.wait()).await {
                Either::First(Ok(())) => {}
                Either::First(Err(fault)) => match self.decide(T::ID, fault) {
                    Action::Halt => return Outcome::Halted(fault),
                    Action::Isolate => return Outcome::Isolated(fault),
                    Action::Restart => task.reset(),
                },
                Either::Second(()) => {
                    info!("{} task stopped", T::ID.name());
                    return Outcome::Stopped;
                }
            }
        }
    }

    /// Ask one supervised task to stop at its next suspension point.
    pub fn request_stop(&self, task: TaskId) {
        self.stops[task.index()].signal(());
    }

    pub fn request_shutdown(&self) {
        for stop in &self.stops {
            stop.signal(());
        }
    }

    pub fn status(&self) -> SupervisorStatus {
        SupervisorStatus {
            uptime_seconds: self.uptime(),
            faults: self.faults.load(Ordering::Relaxed),
            restarts: [
                self.restarts[0].load(Ordering::Relaxed),
                self.restarts[1].load(Ordering::Relaxed),
                self.restarts[2].load(Ordering::Relaxed),
            ],
            pipeline: self.pipeline.stats(),
        }
    }

    /// Get current uptime in seconds
    pub fn uptime(&self) -> u32 {
        self.uptime_seconds.load(Ordering::Relaxed)
    }

    /// Account `seconds` of uptime; returns `true` when a report is due.
    pub fn tick(&self, seconds: u32) -> bool {
        let uptime = self.uptime_seconds.fetch_add(seconds, Ordering::Relaxed) + seconds;
        let last = self.last_report.load(Ordering::Relaxed);
        if uptime - last >= config::STATUS_REPORT_SECS {
            self.last_report.store(uptime, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Run the status heartbeat loop
    pub async fn monitor(&self) -> ! {
        info!("Application supervisor started");
        let period = config::STATUS_TICK_SECS;

        loop {
            Timer::after(Duration::from_secs(period)).await;
            if self.tick(period as u32) {
                self.print_status();
            }
        }
    }

    /// Print current application status
    fn print_status(&self) {
        let status = self.status();
        let minutes = status.uptime_seconds / 60;
        let hours = minutes / 60;
        let remaining_minutes = minutes % 60;

        if hours > 0 {
            info!("Status: Uptime {}h{}m", hours, remaining_minutes);
        } else {
            info!("Status: Uptime {}m", minutes);
        }
        info!(
            "Status: {} presses ({} coalesced), {} states sent, {} applied, {} faults",
            status.pipeline.signal.posts,
            status.pipeline.signal.coalesced,
            status.pipeline.handoff.sent,
            status.pipeline.handoff.received,
            status.faults
        );
    }
}
