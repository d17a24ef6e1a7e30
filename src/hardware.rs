//! Hardware abstraction and initialization
//!
//! Board bring-up for the Raspberry Pi Pico and the Embassy tasks that
//! wrap the supervised pipeline tasks. Everything here is RP2040 specific;
//! the protocol itself lives in the hardware-independent modules.

use embassy_executor::{SpawnError, Spawner};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::Peripherals;
use embassy_time::{Duration, Timer};

use crate::channels::Pipeline;
use crate::config::{self, ConsumerConfig, ProducerConfig};
use crate::consumer::ConsumerTask;
use crate::error::Fault;
use crate::producer::ProducerTask;
use crate::stimulus::{Edge, StimulusTask};
use crate::supervisor::{AppSupervisor, Outcome};
use crate::types::OutputState;

type Supervisor = AppSupervisor<'static>;

/// Pins used by the relay
pub struct Board {
    pub button: Input<'static>,
    pub led_source: Output<'static>,
    pub led_mirror: Output<'static>,
    pub led_status: Output<'static>,
}

/// One-time board setup: clocks, pin multiplexing, GPIO directions.
pub fn init_platform() -> Board {
    let p = embassy_rp::init(Default::default());
    configure_pins(p)
}

/// Pin assignments follow `config::{BUTTON_PIN, LED_SOURCE_PIN, LED_MIRROR_PIN, LED_STATUS_PIN}`
fn configure_pins(p: Peripherals) -> Board {
    let initial = level(config::INITIAL_OUTPUT);

    Board {
        button: Input::new(p.PIN_2, Pull::Up),
        led_source: Output::new(p.PIN_15, initial),
        led_mirror: Output::new(p.PIN_14, initial),
        led_status: Output::new(p.PIN_25, Level::Low),
    }
}

fn level(state: OutputState) -> Level {
    match state {
        OutputState::Low => Level::Low,
        OutputState::High => Level::High,
    }
}

/// Unrecoverable fault: log it and trap into the HardFault handler.
pub fn abort(fault: Fault) -> ! {
    error!("FATAL: {:?}", fault);
    cortex_m::asm::udf()
}

/// Bind the button edge to the signal and spawn all pipeline tasks
pub fn spawn_pipeline_tasks(
    spawner: &Spawner,
    board: Board,
    pipeline: &'static Pipeline,
    supervisor: &'static Supervisor,
) -> Result<(), SpawnError> {
    let stimulus = StimulusTask::new(board.button, Edge::Falling, pipeline.poster());
    let producer = ProducerTask::new(pipeline, board.led_source, ProducerConfig::default());
    let consumer = ConsumerTask::new(pipeline, board.led_mirror, ConsumerConfig::default());

    // Consumer first so it is already parked on the channel
    spawner.spawn(consumer_task(consumer, supervisor))?;
    spawner.spawn(producer_task(producer, supervisor))?;
    spawner.spawn(stimulus_task(stimulus, supervisor))?;
    spawner.spawn(status_task(board.led_status))?;

    Ok(())
}

fn conclude(outcome: Outcome) {
    match outcome {
        Outcome::Halted(fault) => abort(fault),
        Outcome::Isolated(fault) => warn!("task parked after fault: {:?}", fault),
        Outcome::Stopped => {}
    }
}

#[embassy_executor::task]
async fn stimulus_task(
    mut task: StimulusTask<'static, Input<'static>>,
    supervisor: &'static Supervisor,
) {
    conclude(supervisor.run(&mut task).await);
}

#[embassy_executor::task]
async fn producer_task(
    mut task: ProducerTask<'static, Output<'static>>,
    supervisor: &'static Supervisor,
) {
    conclude(supervisor.run(&mut task).await);
}

#[embassy_executor::task]
async fn consumer_task(
    mut task: ConsumerTask<'static, Output<'static>>,
    supervisor: &'static Supervisor,
) {
    conclude(supervisor.run(&mut task).await);
}

/// Status LED task implementation
#[embassy_executor::task]
async fn status_task(mut status_led: Output<'static>) {
    info!("Status LED task started");

    loop {
        // Heartbeat pattern - short blink every second
        status_led.set_high();
        Timer::after(Duration::from_millis(100)).await;
        status_led.set_low();
        Timer::after(Duration::from_millis(900)).await;
    }
}
