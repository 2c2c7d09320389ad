//! Halt entry action and status indicator

use embedded_hal::delay::DelayNs;
use woodstain_hal::DigitalIo;

use crate::config::{PinConfig, PinMap, TimingConfig};
use crate::io::Io;

/// De-energize every actuator and latch the output gate
///
/// Runs without the interlock delay. Order: both solenoids, motor power,
/// both select lines, every stepper driver (disable, then drop step and
/// direction). Afterwards gated writes are dropped and the status LED is
/// lit.
pub fn cascade<B: DigitalIo + DelayNs>(io: &mut Io<B>, pins: &PinMap) {
    io.latch();

    io.drive(pins.top_spray, false);
    io.drive(pins.bottom_spray, false);
    io.drive(pins.motor_power, false);
    if let Some(speed) = pins.motor_speed {
        io.drive(speed, false);
    }
    io.drive(pins.horizontal_select, false);
    io.drive(pins.vertical_select, false);

    for stepper in [
        pins.horizontal_stepper,
        pins.vertical_stepper_a,
        pins.vertical_stepper_b,
    ] {
        io.drive(stepper.enable, false);
        io.drive(stepper.step, false);
        io.drive(stepper.dir, false);
    }

    io.drive(pins.status_led, true);
}

/// Fixed-cadence fault indicator
#[derive(Debug, Clone, Copy)]
pub struct StatusBlink {
    led: PinConfig,
    period_ms: u32,
}

impl StatusBlink {
    pub fn new(led: PinConfig, timing: &TimingConfig) -> Self {
        Self {
            led,
            period_ms: timing.blink_period_ms,
        }
    }

    /// One on/off cycle
    pub fn cycle<B: DigitalIo + DelayNs>(&self, io: &mut Io<B>) {
        io.drive(self.led, true);
        io.sleep_ms(self.period_ms);
        io.drive(self.led, false);
        io.sleep_ms(self.period_ms);
    }
}
