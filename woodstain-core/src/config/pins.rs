//! Pin assignments
//!
//! Pins are described the Klipper way: `"gpio11"`, `"!gpio12"` for an
//! active-low line, `"^gpio4"` to request the internal pull-up.

/// Number of GPIO lines on the target (RP2040)
pub const GPIO_COUNT: u8 = 30;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new active-high pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Enable the pull-up on this pin
    pub const fn with_pullup(self) -> Self {
        Self {
            pull_up: true,
            ..self
        }
    }

    /// Parse a pin string from config
    ///
    /// Supports formats:
    /// - "gpio11" -> active-high
    /// - "!gpio12" -> active-low
    /// - "^gpio4" -> pull-up enabled
    /// - "!^gpio6" -> active-low with pull-up
    pub fn parse(s: &str) -> Option<Self> {
        let mut s = s.trim();
        let mut config = PinConfig::default();

        loop {
            if let Some(rest) = s.strip_prefix('!') {
                config.inverted = true;
                s = rest;
            } else if let Some(rest) = s.strip_prefix('^') {
                config.pull_up = true;
                s = rest;
            } else {
                break;
            }
        }

        let pin: u8 = s.strip_prefix("gpio")?.parse().ok()?;
        if pin >= GPIO_COUNT {
            return None;
        }
        config.pin = pin;
        Some(config)
    }
}

/// Step, direction and enable lines of one stepper driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepperPins {
    /// Step pulse pin
    pub step: PinConfig,
    /// Direction pin (asserted = Down / Left)
    pub dir: PinConfig,
    /// Enable pin (active-low typically)
    pub enable: PinConfig,
}

/// Wiring of the paint head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMap {
    pub top_limit: PinConfig,
    pub bottom_limit: PinConfig,
    pub left_limit: PinConfig,
    pub right_limit: PinConfig,
    /// Optional operator abort button
    pub abort: Option<PinConfig>,
    pub top_spray: PinConfig,
    pub bottom_spray: PinConfig,
    /// Induction motor select lines (never both asserted)
    pub horizontal_select: PinConfig,
    pub vertical_select: PinConfig,
    /// Shared induction motor power line
    pub motor_power: PinConfig,
    /// Optional speed select, asserted for the vertical motor
    pub motor_speed: Option<PinConfig>,
    pub horizontal_stepper: StepperPins,
    /// The two vertical steppers drive one axle from opposite ends
    pub vertical_stepper_a: StepperPins,
    pub vertical_stepper_b: StepperPins,
    pub status_led: PinConfig,
}

impl Default for PinMap {
    /// Raspberry Pi Pico wiring of the reference machine
    fn default() -> Self {
        Self {
            top_limit: PinConfig::new(2),
            bottom_limit: PinConfig::new(3),
            left_limit: PinConfig::new(4),
            right_limit: PinConfig::new(5),
            abort: None,
            top_spray: PinConfig::new(7),
            bottom_spray: PinConfig::new(8),
            horizontal_select: PinConfig::new(9),
            vertical_select: PinConfig::new(10),
            motor_power: PinConfig::new(11),
            motor_speed: None,
            horizontal_stepper: StepperPins {
                step: PinConfig::new(12),
                dir: PinConfig::new(13),
                enable: PinConfig::inverted(14),
            },
            vertical_stepper_a: StepperPins {
                step: PinConfig::new(15),
                dir: PinConfig::new(16),
                enable: PinConfig::inverted(17),
            },
            vertical_stepper_b: StepperPins {
                step: PinConfig::new(18),
                dir: PinConfig::new(19),
                enable: PinConfig::inverted(20),
            },
            status_led: PinConfig::new(25),
        }
    }
}

impl PinMap {
    /// Input lines with their pull-up requests
    pub fn inputs(&self) -> impl Iterator<Item = PinConfig> + '_ {
        [
            Some(self.top_limit),
            Some(self.bottom_limit),
            Some(self.left_limit),
            Some(self.right_limit),
            self.abort,
        ]
        .into_iter()
        .flatten()
    }

    /// Output lines
    pub fn outputs(&self) -> impl Iterator<Item = PinConfig> + '_ {
        let h = self.horizontal_stepper;
        let a = self.vertical_stepper_a;
        let b = self.vertical_stepper_b;
        [
            self.top_spray,
            self.bottom_spray,
            self.horizontal_select,
            self.vertical_select,
            self.motor_power,
            h.step,
            h.dir,
            h.enable,
            a.step,
            a.dir,
            a.enable,
            b.step,
            b.dir,
            b.enable,
            self.status_led,
        ]
        .into_iter()
        .chain(self.motor_speed)
    }
}
