//! Paint program
//!
//! Homes the head against the top and left switches, then paints
//! alternating vertical passes, advancing right by one gap between passes
//! until the right switch has been reached.

use embedded_hal::delay::DelayNs;
use woodstain_hal::DigitalIo;

use crate::controller::Controller;
use crate::interlock::Axis;
use crate::motion::{Direction, Profile, UNTIL_LIMIT};
use crate::safety::Halted;
use crate::state::Event;

/// Result of a completed program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgramReport {
    /// Vertical passes painted
    pub strokes: u32,
}

/// Full-panel staining run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintProgram {
    profile: Profile,
}

impl Default for PaintProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl PaintProgram {
    pub fn new() -> Self {
        Self {
            profile: Profile::Ramped,
        }
    }

    /// Use a fixed or ramped delay schedule for the vertical passes
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn run<B: DigitalIo + DelayNs>(
        &self,
        ctl: &mut Controller<B>,
    ) -> Result<ProgramReport, Halted> {
        self.home(ctl)?;

        info!("Stroking");
        ctl.apply(Event::StartStroke);

        let gap = ctl.stroke().horizontal_gap_steps;
        let mut direction = Direction::Down;
        let mut strokes = 0;
        let mut right_reached = false;

        loop {
            ctl.set_active_axis(Axis::Vertical)?;
            ctl.paint_vertical(direction, UNTIL_LIMIT, self.profile)?;
            ctl.sprays_off()?;
            strokes += 1;
            direction = direction.opposite();

            if right_reached {
                break;
            }

            ctl.set_active_axis(Axis::Horizontal)?;
            right_reached = ctl.move_horizontal(Direction::Right, gap)?.limit_reached;
        }

        ctl.sprays_off()?;
        ctl.turn_off_motors()?;
        ctl.apply(Event::StrokeComplete);
        info!("Program complete: {} strokes", strokes);

        Ok(ProgramReport { strokes })
    }

    fn home<B: DigitalIo + DelayNs>(&self, ctl: &mut Controller<B>) -> Result<(), Halted> {
        info!("Homing");
        ctl.apply(Event::StartHoming);

        ctl.set_active_axis(Axis::Vertical)?;
        ctl.move_vertical(Direction::Up, UNTIL_LIMIT, self.profile)?;
        ctl.set_active_axis(Axis::Horizontal)?;
        ctl.move_horizontal(Direction::Left, UNTIL_LIMIT)?;

        ctl.apply(Event::HomingComplete);
        Ok(())
    }
}
