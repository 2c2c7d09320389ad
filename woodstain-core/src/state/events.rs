//! Events that trigger state transitions

use crate::safety::Fault;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Program phases
    /// Seeking the top and left home switches
    StartHoming,
    /// Both home switches reached
    HomingComplete,
    /// Motion started (a vertical pass, a traverse or a standalone move)
    StartStroke,
    /// Motion finished normally, including stopping on a limit
    StrokeComplete,

    // Safety
    /// Invariant violation or operator abort
    Fault(Fault),
}

impl Event {
    /// Check if this event indicates a fault
    pub fn is_fault(&self) -> bool {
        matches!(self, Event::Fault(_))
    }
}
