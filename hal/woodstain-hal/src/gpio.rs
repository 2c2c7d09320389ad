//! GPIO abstractions
//!
//! The controller addresses pins by number, the way the machine's wiring
//! tables do. A board owns every pin it hands out and maps numbers to
//! physical lines.

/// Electrical level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Build a level from a boolean (true = high)
    pub const fn from_bool(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }

    /// Check if this is the high level
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    /// The other level
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        Level::from_bool(high)
    }
}

/// Pin-number addressed digital I/O
///
/// Implementations must make `write_pin` take effect before returning, so
/// that two consecutive writes reach the hardware in program order.
pub trait DigitalIo {
    /// Sample an input line
    ///
    /// Reading a pin the board does not own returns `Level::Low`.
    fn read_pin(&mut self, pin: u8) -> Level;

    /// Drive an output line
    ///
    /// Writing a pin the board does not own is ignored.
    fn write_pin(&mut self, pin: u8, level: Level);
}

impl<T: DigitalIo + ?Sized> DigitalIo for &mut T {
    fn read_pin(&mut self, pin: u8) -> Level {
        (**self).read_pin(pin)
    }

    fn write_pin(&mut self, pin: u8, level: Level) {
        (**self).write_pin(pin, level)
    }
}
