//! Woodstain - Wood-Staining Paint Head Firmware
//!
//! Main firmware binary for RP2040-based paint head controllers. Loads the
//! embedded `machine.toml`, claims the configured pins, homes the head and
//! paints one full panel. Any fault leaves the outputs de-energized and the
//! status LED blinking until power is removed.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

use woodstain_core::config::{parse_config, MachineConfig};
use woodstain_core::{Controller, PaintProgram};
use woodstain_hal_rp2040::{PinBank, RpBoard};

/// Embedded configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../machine.toml");

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Woodstain firmware starting...");

    let p = embassy_rp::init(Default::default());
    let config = load_config();

    let mut bank = PinBank::new(p);
    let board = match RpBoard::new(&mut bank, &config.pins) {
        Ok(board) => board,
        Err(e) => {
            error!("Pin setup failed: {}", e);
            core::future::pending().await
        }
    };

    let mut controller = Controller::new(board, &config);
    match PaintProgram::new().run(&mut controller) {
        Ok(report) => info!("Panel finished: {} strokes", report.strokes),
        Err(halted) => {
            error!("Halted: {}", halted.reason.reason());
            controller.run_halted();
        }
    }

    // Outputs are off; a new panel needs a reset
    core::future::pending::<()>().await;
}

/// Parse and validate the embedded configuration
///
/// The build script already rejected invalid files, so falling back to the
/// defaults only happens if the two parsers disagree.
fn load_config() -> MachineConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            warn!("machine.toml line {}: {}, using defaults", e.line, e.kind);
            return MachineConfig::default();
        }
    };

    match config.validate() {
        Ok(()) => {
            info!(
                "Config loaded: debounce {} ms, switch delay {} ms",
                config.timing.debounce_ms, config.timing.motor_switch_delay_ms
            );
            config
        }
        Err(e) => {
            warn!("Invalid machine.toml ({}), using defaults", e);
            MachineConfig::default()
        }
    }
}
