//! Configuration type definitions
//!
//! Defaults reproduce the constants of the reference machine.

use heapless::FnvIndexSet;

use super::pins::PinMap;

/// Milliseconds a switch reading must stay stable before it is accepted
pub const DEFAULT_DEBOUNCE_MS: u32 = 150;

/// Cool-down between de-energizing one induction motor and energizing the next
pub const DEFAULT_MOTOR_SWITCH_DELAY_MS: u32 = 3000;

/// Status LED half period while halted
pub const DEFAULT_BLINK_PERIOD_MS: u32 = 300;

/// Timing of blocking waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Debounce window for limit switches (ms)
    pub debounce_ms: u32,
    /// Interlock delay between motor switches (ms)
    pub motor_switch_delay_ms: u32,
    /// Sampling period of blocking switch waits (ms)
    pub poll_interval_ms: u32,
    /// Status LED on/off time while halted (ms)
    pub blink_period_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            motor_switch_delay_ms: DEFAULT_MOTOR_SWITCH_DELAY_MS,
            poll_interval_ms: 1,
            blink_period_ms: DEFAULT_BLINK_PERIOD_MS,
        }
    }
}

/// Spray band thresholds, in strokes counted from the top home switch
///
/// Below `min` only the top spray works, above `max` only the bottom one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SprayConfig {
    pub min: u32,
    pub max: u32,
}

impl Default for SprayConfig {
    fn default() -> Self {
        Self { min: 2, max: 15 }
    }
}

/// Step delay ramp of one axis (all values in microseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampConfig {
    /// Top speed floor
    pub min_delay_us: u32,
    /// Slowest permitted rate
    pub max_delay_us: u32,
    /// Delay of the first and last step of a ramped move
    pub start_gap_us: u32,
    /// Delay change per step while accelerating or decelerating
    pub ramp_step_us: u32,
}

impl RampConfig {
    /// Horizontal traverse stepper
    pub const fn horizontal() -> Self {
        Self {
            min_delay_us: 150,
            max_delay_us: 1600,
            start_gap_us: 600,
            ramp_step_us: 5,
        }
    }

    /// Vertical stepper pair
    pub const fn vertical() -> Self {
        Self {
            min_delay_us: 100,
            max_delay_us: 1200,
            start_gap_us: 1200,
            ramp_step_us: 10,
        }
    }

    /// Check if a delay lies in `[min_delay_us, max_delay_us]`
    pub fn contains(&self, delay_us: u32) -> bool {
        (self.min_delay_us..=self.max_delay_us).contains(&delay_us)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay_us == 0 || self.ramp_step_us == 0 {
            return Err(ConfigError::ZeroValue);
        }
        if self.min_delay_us > self.start_gap_us || self.start_gap_us > self.max_delay_us {
            return Err(ConfigError::RampOrder);
        }
        Ok(())
    }
}

/// Stroke geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StrokeConfig {
    /// Vertical steps per spray band
    pub vertical_gap_steps: u32,
    /// Horizontal advance between vertical passes
    pub horizontal_gap_steps: u32,
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            vertical_gap_steps: 3000,
            horizontal_gap_steps: 3000,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A delay, gap or window is zero
    ZeroValue,
    /// Ramp must satisfy min_delay <= start_gap <= max_delay
    RampOrder,
    /// Spray thresholds must satisfy min <= max
    SprayOrder,
    /// The same GPIO is assigned twice
    DuplicatePin(u8),
    /// GPIO number out of range
    InvalidPin(u8),
}

/// Complete machine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MachineConfig {
    pub pins: PinMap,
    pub timing: TimingConfig,
    pub spray: SprayConfig,
    pub vertical: RampConfig,
    pub horizontal: RampConfig,
    pub stroke: StrokeConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineConfig {
    /// Reference machine configuration
    pub fn new() -> Self {
        Self {
            pins: PinMap::default(),
            timing: TimingConfig::default(),
            spray: SprayConfig::default(),
            vertical: RampConfig::vertical(),
            horizontal: RampConfig::horizontal(),
            stroke: StrokeConfig::default(),
        }
    }

    /// Check the configuration for values the controller cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timing;
        if t.debounce_ms == 0 || t.poll_interval_ms == 0 || t.blink_period_ms == 0 {
            return Err(ConfigError::ZeroValue);
        }
        if self.stroke.vertical_gap_steps == 0 || self.stroke.horizontal_gap_steps == 0 {
            return Err(ConfigError::ZeroValue);
        }
        if self.spray.min > self.spray.max {
            return Err(ConfigError::SprayOrder);
        }
        self.vertical.validate()?;
        self.horizontal.validate()?;

        let mut seen: FnvIndexSet<u8, 32> = FnvIndexSet::new();
        for pin in self.pins.inputs().chain(self.pins.outputs()) {
            if pin.pin >= super::GPIO_COUNT {
                return Err(ConfigError::InvalidPin(pin.pin));
            }
            match seen.insert(pin.pin) {
                Ok(true) => {}
                _ => return Err(ConfigError::DuplicatePin(pin.pin)),
            }
        }
        Ok(())
    }
}
