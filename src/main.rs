//! LedRelay - firmware entry point
//!
//! Hardware: Raspberry Pi Pico (RP2040)
//! Button: GPIO2 to GND (pull-up, falling edge)
//! LEDs: GPIO15 toggled on each press, GPIO14 mirrors it one second later

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_halt as _};

use ledrelay::channels::Pipeline;
use ledrelay::config::{self, SupervisorConfig};
use ledrelay::hardware;
use ledrelay::supervisor::AppSupervisor;

// Created once at startup, live for the program lifetime
static PIPELINE: StaticCell<Pipeline> = StaticCell::new();
static SUPERVISOR: StaticCell<AppSupervisor<'static>> = StaticCell::new();

// ===================================================================
// Main Application Entry Point
// ===================================================================

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let board = hardware::init_platform();

    let pipeline: &'static Pipeline = PIPELINE.init(Pipeline::new(config::SIGNAL_MODE));
    let supervisor: &'static AppSupervisor<'static> =
        SUPERVISOR.init(AppSupervisor::new(pipeline, SupervisorConfig::default()));

    supervisor.print_startup_banner();

    unwrap!(hardware::spawn_pipeline_tasks(
        &spawner, board, pipeline, supervisor
    ));

    supervisor.print_init_success();

    // Main supervisor loop
    supervisor.monitor().await
}
