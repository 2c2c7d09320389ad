//! State machine definition
//!
//! All actuator behavior is gated by the current state.

use super::events::Event;
use crate::safety::Fault;

/// Controller phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// Ready, nothing moving
    #[default]
    Idle,
    /// Seeking the home switches
    Homing,
    /// Painting or traversing
    Stroking,
    /// Fault latched; outputs de-energized until power cycle
    Halted(Fault),
}

impl MotionState {
    /// Check if actuators may be commanded in this state
    pub fn motion_allowed(&self) -> bool {
        !self.is_halted()
    }

    /// Check if this is the terminal fault state
    pub fn is_halted(&self) -> bool {
        matches!(self, MotionState::Halted(_))
    }

    /// Fault that caused the halt, if any
    pub fn fault(&self) -> Option<Fault> {
        match self {
            MotionState::Halted(fault) => Some(*fault),
            _ => None,
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use MotionState::*;

        match (self, event) {
            // Halted absorbs everything, including further faults
            (Halted(_), _) => self,
            (_, Event::Fault(fault)) => Halted(fault),

            (Idle, Event::StartHoming) => Homing,
            (Idle, Event::StartStroke) => Stroking,

            // Homing moves are strokes nested inside the phase
            (Homing, Event::HomingComplete) => Idle,

            (Stroking, Event::StrokeComplete) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
