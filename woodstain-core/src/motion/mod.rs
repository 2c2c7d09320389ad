//! Motion
//!
//! Directions, step delay ramps, the step pulse primitive and the
//! dual-axis actuator driver.

pub mod driver;
pub mod pulse;
pub mod ramp;

pub use driver::{ActuatorDriver, MoveOutcome, UNTIL_LIMIT};
pub use pulse::StepChannel;
pub use ramp::Profile;

use crate::interlock::Axis;
use crate::safety::Fault;

/// Travel direction of the paint head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Wire code (UP=0, DOWN=1, LEFT=2, RIGHT=3)
    pub const fn code(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// Decode a wire code
    pub fn from_code(code: u8) -> Result<Self, Fault> {
        match code {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Down),
            2 => Ok(Direction::Left),
            3 => Ok(Direction::Right),
            other => Err(Fault::UnknownDirection(other)),
        }
    }

    /// Axis this direction moves along
    pub const fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    /// Get the opposite direction
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Direction line is asserted for Down and Left
    pub const fn dir_asserted(self) -> bool {
        matches!(self, Direction::Down | Direction::Left)
    }
}
