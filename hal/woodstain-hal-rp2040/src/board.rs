//! RP2040 board
//!
//! Owns every line named in the pin map as a `Flex` pin configured once
//! at startup. Reads of unconfigured pins return low and writes to them
//! are dropped.

use embassy_rp::gpio::{Flex, Level as RpLevel, Pull};
use embassy_time::Delay;
use embedded_hal::delay::DelayNs;
use woodstain_core::config::{PinMap, GPIO_COUNT};
use woodstain_hal::{DigitalIo, Level};

use crate::pins::{PinBank, PinError};

pub struct RpBoard {
    lines: [Option<Flex<'static>>; GPIO_COUNT as usize],
    delay: Delay,
}

impl RpBoard {
    /// Claim and configure every input and output of the pin map
    ///
    /// Outputs start at their deasserted level.
    pub fn new(bank: &mut PinBank, pins: &PinMap) -> Result<Self, PinError> {
        let mut lines: [Option<Flex<'static>>; GPIO_COUNT as usize] =
            core::array::from_fn(|_| None);

        for input in pins.inputs() {
            let mut flex = Flex::new(bank.take(input.pin)?);
            flex.set_pull(if input.pull_up { Pull::Up } else { Pull::None });
            flex.set_as_input();
            lines[usize::from(input.pin)] = Some(flex);
        }

        for output in pins.outputs() {
            let mut flex = Flex::new(bank.take(output.pin)?);
            let idle = if output.inverted {
                RpLevel::High
            } else {
                RpLevel::Low
            };
            flex.set_level(idle);
            flex.set_as_output();
            lines[usize::from(output.pin)] = Some(flex);
        }

        Ok(Self {
            lines,
            delay: Delay,
        })
    }
}

impl DigitalIo for RpBoard {
    fn read_pin(&mut self, pin: u8) -> Level {
        match self.lines.get(usize::from(pin)) {
            Some(Some(line)) => Level::from_bool(line.is_high()),
            _ => Level::Low,
        }
    }

    fn write_pin(&mut self, pin: u8, level: Level) {
        if let Some(Some(line)) = self.lines.get_mut(usize::from(pin)) {
            line.set_level(if level.is_high() {
                RpLevel::High
            } else {
                RpLevel::Low
            });
        }
    }
}

impl DelayNs for RpBoard {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
