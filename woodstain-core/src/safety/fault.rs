//! Fault taxonomy

use core::fmt;

use crate::limits::LimitSwitch;
use crate::motion::Direction;

/// Fatal conditions, all routed to the halt cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Waited for a press on a switch that was already pressed
    SwitchAlreadyPressed(LimitSwitch),
    /// Waited for a release on a switch that was not pressed
    SwitchNotPressed(LimitSwitch),
    /// Two opposing switches pressed inside one debounce window
    BothLimitsPressed(LimitSwitch, LimitSwitch),
    /// Raw direction code outside 0..=3
    UnknownDirection(u8),
    /// Raw axis code outside 0..=2
    UnknownAxis(u8),
    /// Vertical direction sent to the horizontal drive or vice versa
    DirectionNotOnAxis(Direction),
    /// Step delay outside the axis ramp range (µs)
    DelayOutOfRange(u32),
    /// Abort input asserted or `Controller::abort` called
    OperatorAbort,
}

impl Fault {
    /// Short human-readable reason
    pub const fn reason(&self) -> &'static str {
        match self {
            Fault::SwitchAlreadyPressed(_) => "switch already pressed",
            Fault::SwitchNotPressed(_) => "switch not pressed",
            Fault::BothLimitsPressed(..) => "both limits pressed",
            Fault::UnknownDirection(_) => "unknown direction",
            Fault::UnknownAxis(_) => "unknown axis",
            Fault::DirectionNotOnAxis(_) => "direction not on axis",
            Fault::DelayOutOfRange(_) => "step delay out of range",
            Fault::OperatorAbort => "operator abort",
        }
    }

    /// Check if this fault is a mechanical condition rather than a logic error
    pub fn is_mechanical(&self) -> bool {
        matches!(
            self,
            Fault::SwitchAlreadyPressed(_)
                | Fault::SwitchNotPressed(_)
                | Fault::BothLimitsPressed(..)
        )
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Returned by every controller operation once the halt cascade has run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Halted {
    pub reason: Fault,
}

impl fmt::Display for Halted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "halted: {}", self.reason)
    }
}
