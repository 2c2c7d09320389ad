//! Motor interlock and power sequencer
//!
//! Owns the active induction motor. Every change goes through `None` with
//! the full switch delay in between, even when the same axis is requested
//! again, and the two select lines are never asserted together. Boards
//! with a speed select line get it set for the chosen motor before power
//! comes on.

use embedded_hal::delay::DelayNs;
use woodstain_hal::DigitalIo;

use crate::config::{MachineConfig, PinConfig, StepperPins};
use crate::io::Io;
use crate::safety::Fault;

/// Induction motor holding power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    Horizontal,
    Vertical,
    #[default]
    None,
}

impl Axis {
    /// Wire code (HORIZONTAL=0, VERTICAL=1, NONE=2)
    pub const fn code(self) -> u8 {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
            Axis::None => 2,
        }
    }

    /// Decode a wire code
    pub fn from_code(code: u8) -> Result<Self, Fault> {
        match code {
            0 => Ok(Axis::Horizontal),
            1 => Ok(Axis::Vertical),
            2 => Ok(Axis::None),
            other => Err(Fault::UnknownAxis(other)),
        }
    }
}

/// Select, power and stepper enable sequencing
#[derive(Debug, Clone)]
pub struct Interlock {
    horizontal_select: PinConfig,
    vertical_select: PinConfig,
    motor_power: PinConfig,
    motor_speed: Option<PinConfig>,
    horizontal_stepper: StepperPins,
    vertical_stepper_a: StepperPins,
    vertical_stepper_b: StepperPins,
    switch_delay_ms: u32,
    active: Axis,
}

impl Interlock {
    pub fn new(config: &MachineConfig) -> Self {
        let pins = &config.pins;
        Self {
            horizontal_select: pins.horizontal_select,
            vertical_select: pins.vertical_select,
            motor_power: pins.motor_power,
            motor_speed: pins.motor_speed,
            horizontal_stepper: pins.horizontal_stepper,
            vertical_stepper_a: pins.vertical_stepper_a,
            vertical_stepper_b: pins.vertical_stepper_b,
            switch_delay_ms: config.timing.motor_switch_delay_ms,
            active: Axis::None,
        }
    }

    /// Axis currently holding power
    pub fn active(&self) -> Axis {
        self.active
    }

    /// De-energize, wait the switch delay, energize `axis`
    ///
    /// Requesting `Axis::None` behaves like [`Interlock::turn_off_motors`].
    /// The abort input is sampled after the delay, before anything is
    /// energized.
    pub fn set_active_axis<B: DigitalIo + DelayNs>(
        &mut self,
        io: &mut Io<B>,
        axis: Axis,
    ) -> Result<(), Fault> {
        self.deenergize(io);
        io.sleep_ms(self.switch_delay_ms);
        io.check_abort()?;

        match axis {
            Axis::Horizontal => {
                io.set(self.horizontal_select, true);
                io.set(self.horizontal_stepper.enable, true);
            }
            Axis::Vertical => {
                io.set(self.vertical_select, true);
                io.set(self.vertical_stepper_a.enable, true);
                io.set(self.vertical_stepper_b.enable, true);
            }
            Axis::None => return Ok(()),
        }
        if let Some(speed) = self.motor_speed {
            io.set(speed, axis == Axis::Vertical);
        }
        io.set(self.motor_power, true);
        self.active = axis;
        info!("Motor {} energized", axis);
        Ok(())
    }

    /// De-energize and wait the switch delay
    pub fn turn_off_motors<B: DigitalIo + DelayNs>(&mut self, io: &mut Io<B>) -> Result<(), Fault> {
        self.set_active_axis(io, Axis::None)
    }

    /// Forget the active axis after the halt cascade cut every line
    pub(crate) fn forget(&mut self) {
        self.active = Axis::None;
    }

    fn deenergize<B: DigitalIo + DelayNs>(&mut self, io: &mut Io<B>) {
        io.set(self.motor_power, false);
        if let Some(speed) = self.motor_speed {
            io.set(speed, false);
        }
        io.set(self.horizontal_select, false);
        io.set(self.vertical_select, false);
        for stepper in [
            self.horizontal_stepper,
            self.vertical_stepper_a,
            self.vertical_stepper_b,
        ] {
            io.set(stepper.enable, false);
        }
        if self.active != Axis::None {
            info!("Motor {} de-energized", self.active);
        }
        self.active = Axis::None;
    }
}
