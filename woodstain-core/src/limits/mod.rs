//! Limit switches
//!
//! The four switches bounding the travel envelope are the only ground
//! truth about where the paint head is.

pub mod monitor;

pub use monitor::LimitMonitor;

use crate::config::{PinConfig, PinMap};
use crate::motion::Direction;

/// One of the four physical limit switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitSwitch {
    Top,
    Bottom,
    Left,
    Right,
}

impl LimitSwitch {
    /// Switch that bounds travel in a direction
    pub const fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => LimitSwitch::Top,
            Direction::Down => LimitSwitch::Bottom,
            Direction::Left => LimitSwitch::Left,
            Direction::Right => LimitSwitch::Right,
        }
    }

    /// Direction this switch bounds
    pub const fn direction(self) -> Direction {
        match self {
            LimitSwitch::Top => Direction::Up,
            LimitSwitch::Bottom => Direction::Down,
            LimitSwitch::Left => Direction::Left,
            LimitSwitch::Right => Direction::Right,
        }
    }

    /// Input line of this switch
    pub const fn pin(self, pins: &PinMap) -> PinConfig {
        match self {
            LimitSwitch::Top => pins.top_limit,
            LimitSwitch::Bottom => pins.bottom_limit,
            LimitSwitch::Left => pins.left_limit,
            LimitSwitch::Right => pins.right_limit,
        }
    }

    const fn index(self) -> usize {
        match self {
            LimitSwitch::Top => 0,
            LimitSwitch::Bottom => 1,
            LimitSwitch::Left => 2,
            LimitSwitch::Right => 3,
        }
    }
}

/// Debounced contact state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchLevel {
    #[default]
    Released,
    Pressed,
}

/// Last accepted state of a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchState {
    pub level: SwitchLevel,
    /// Controller clock (ms) when the level was accepted
    pub last_transition_ms: u64,
}
