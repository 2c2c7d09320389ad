//! Step pulse primitive
//!
//! One step is: assert the direction lines, raise the step lines, hold for
//! the delay, lower the step lines, hold again. Several drivers pulsed in
//! one call see their step edges back to back, never staggered by a delay.
//! Nothing here looks at the limit switches; callers do that.

use embedded_hal::delay::DelayNs;
use woodstain_hal::DigitalIo;

use crate::config::{RampConfig, StepperPins};
use crate::io::Io;
use crate::safety::Fault;

/// One driver to pulse and the state of its direction line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepChannel {
    pub pins: StepperPins,
    /// Direction line asserted
    pub dir: bool,
}

/// Emit one step pulse on every channel
pub fn emit<B: DigitalIo + DelayNs>(io: &mut Io<B>, channels: &[StepChannel], delay_us: u32) {
    for ch in channels {
        io.set(ch.pins.dir, ch.dir);
    }
    for ch in channels {
        io.set(ch.pins.step, true);
    }
    io.sleep_us(delay_us);
    for ch in channels {
        io.set(ch.pins.step, false);
    }
    io.sleep_us(delay_us);
}

/// Check a delay against the axis bounds
///
/// Debug builds reject a delay outside `[min_delay_us, max_delay_us]`;
/// release builds clamp it into the range.
pub fn checked_delay(ramp: &RampConfig, delay_us: u32) -> Result<u32, Fault> {
    if ramp.contains(delay_us) {
        return Ok(delay_us);
    }
    if cfg!(debug_assertions) {
        Err(Fault::DelayOutOfRange(delay_us))
    } else {
        Ok(delay_us.clamp(ramp.min_delay_us, ramp.max_delay_us))
    }
}
