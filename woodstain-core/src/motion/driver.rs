//! Dual-axis actuator driver
//!
//! Maps logical directions onto the stepper outputs. The two vertical
//! steppers turn one axle from opposite ends, so their direction lines are
//! driven in antiphase while their step lines are pulsed together. The
//! boundary switch of the direction of travel is sampled before every
//! step; a press held for the debounce window ends the move normally.
//!
//! A vertical run to a switch is ramped against the panel height measured
//! on an earlier top-to-bottom pass. Until that height is known, such runs
//! seek the switch at the start gap.

use embedded_hal::delay::DelayNs;
use woodstain_hal::DigitalIo;

use super::pulse::{self, StepChannel};
use super::ramp::Profile;
use super::Direction;
use crate::config::{MachineConfig, RampConfig, StepperPins};
use crate::interlock::Axis;
use crate::io::Io;
use crate::limits::{LimitMonitor, LimitSwitch};
use crate::safety::Fault;

/// Step count meaning "until the boundary switch"
pub const UNTIL_LIMIT: u32 = u32::MAX;

/// How a move ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveOutcome {
    /// Pulses emitted
    pub steps: u32,
    /// Move stopped on the boundary switch
    pub limit_reached: bool,
}

/// Stepper outputs and the vertical step counter
#[derive(Debug, Clone)]
pub struct ActuatorDriver {
    horizontal: StepperPins,
    vertical_a: StepperPins,
    vertical_b: StepperPins,
    horizontal_ramp: RampConfig,
    vertical_ramp: RampConfig,
    /// Signed steps below the top switch
    position: i32,
    /// Position is counted from the top switch
    homed: bool,
    /// Steps between the top and bottom switches
    span: Option<u32>,
}

impl ActuatorDriver {
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            horizontal: config.pins.horizontal_stepper,
            vertical_a: config.pins.vertical_stepper_a,
            vertical_b: config.pins.vertical_stepper_b,
            horizontal_ramp: config.horizontal,
            vertical_ramp: config.vertical,
            position: 0,
            homed: false,
            span: None,
        }
    }

    /// Vertical position in steps below the top switch
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Panel height measured between the vertical switches
    pub fn span(&self) -> Option<u32> {
        self.span
    }

    /// Steps a vertical run to the switch is expected to take
    fn expected_travel(&self, direction: Direction) -> Option<u32> {
        if !self.homed {
            return None;
        }
        let position = u32::try_from(self.position).ok()?;
        let remaining = match direction {
            Direction::Down => self.span?.checked_sub(position)?,
            _ => position,
        };
        (remaining > 0).then_some(remaining)
    }

    /// Drive the vertical steppers in antiphase
    ///
    /// `on_step` runs after every emitted pulse with the updated position.
    /// A move that stops on the top switch re-zeroes the position; one
    /// that then reaches the bottom switch records the panel height.
    pub fn move_vertical<B, F>(
        &mut self,
        io: &mut Io<B>,
        limits: &mut LimitMonitor,
        direction: Direction,
        steps: u32,
        profile: Profile,
        mut on_step: F,
    ) -> Result<MoveOutcome, Fault>
    where
        B: DigitalIo + DelayNs,
        F: FnMut(&mut Io<B>, i32),
    {
        if direction.axis() != Axis::Vertical {
            return Err(Fault::DirectionNotOnAxis(direction));
        }

        let channels = [
            StepChannel {
                pins: self.vertical_a,
                dir: direction.dir_asserted(),
            },
            StepChannel {
                pins: self.vertical_b,
                dir: !direction.dir_asserted(),
            },
        ];
        let delta = match direction {
            Direction::Down => 1,
            _ => -1,
        };
        let ramp = self.vertical_ramp;
        let plan = match steps {
            UNTIL_LIMIT => self.expected_travel(direction),
            n => Some(n),
        };

        let outcome = run(io, limits, &channels, direction, steps, plan, profile, &ramp, |io| {
            self.position = self.position.saturating_add(delta);
            on_step(io, self.position);
        })?;

        if outcome.limit_reached {
            match direction {
                Direction::Up => {
                    self.position = 0;
                    self.homed = true;
                }
                _ if self.homed => {
                    self.span = u32::try_from(self.position).ok().filter(|&n| n > 0);
                    debug!("Panel span {} steps", self.position);
                }
                _ => {}
            }
        }
        debug!(
            "Vertical {} done: {} steps, limit {}, position {}",
            direction, outcome.steps, outcome.limit_reached, self.position
        );
        Ok(outcome)
    }

    /// Drive the horizontal stepper with the horizontal ramp
    pub fn move_horizontal<B: DigitalIo + DelayNs>(
        &mut self,
        io: &mut Io<B>,
        limits: &mut LimitMonitor,
        direction: Direction,
        steps: u32,
    ) -> Result<MoveOutcome, Fault> {
        if direction.axis() != Axis::Horizontal {
            return Err(Fault::DirectionNotOnAxis(direction));
        }

        let channels = [StepChannel {
            pins: self.horizontal,
            dir: direction.dir_asserted(),
        }];
        let ramp = self.horizontal_ramp;
        let plan = (steps != UNTIL_LIMIT).then_some(steps);

        let outcome = run(
            io,
            limits,
            &channels,
            direction,
            steps,
            plan,
            Profile::Ramped,
            &ramp,
            |_| {},
        )?;
        debug!(
            "Horizontal {} done: {} steps, limit {}",
            direction, outcome.steps, outcome.limit_reached
        );
        Ok(outcome)
    }
}

#[allow(clippy::too_many_arguments)]
fn run<B, F>(
    io: &mut Io<B>,
    limits: &mut LimitMonitor,
    channels: &[StepChannel],
    direction: Direction,
    steps: u32,
    plan: Option<u32>,
    profile: Profile,
    ramp: &RampConfig,
    mut after_step: F,
) -> Result<MoveOutcome, Fault>
where
    B: DigitalIo + DelayNs,
    F: FnMut(&mut Io<B>),
{
    let boundary = LimitSwitch::for_direction(direction);
    let mut taken = 0;

    while taken < steps {
        io.check_abort()?;
        if limits.is_pressed(io, boundary) && limits.confirm_press(io, boundary)? {
            return Ok(MoveOutcome {
                steps: taken,
                limit_reached: true,
            });
        }
        let delay_us = match plan {
            Some(total) => profile.delay_for(ramp, taken, total),
            None => profile.seek_delay(ramp),
        };
        let delay_us = pulse::checked_delay(ramp, delay_us)?;
        pulse::emit(io, channels, delay_us);
        taken += 1;
        after_step(io);
    }

    Ok(MoveOutcome {
        steps: taken,
        limit_reached: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBoard;

    fn setup() -> (MachineConfig, ActuatorDriver, LimitMonitor) {
        let config = MachineConfig::default();
        let driver = ActuatorDriver::new(&config);
        let limits = LimitMonitor::new(&config.pins, &config.timing);
        (config, driver, limits)
    }

    #[test]
    fn test_vertical_antiphase_and_synchronous() {
        let (config, mut driver, mut limits) = setup();
        let pins = config.pins;
        let mut io = Io::new(SimBoard::new(), None);

        let outcome = driver
            .move_vertical(&mut io, &mut limits, Direction::Down, 10, Profile::Ramped, |_, _| {})
            .unwrap();

        assert_eq!(outcome, MoveOutcome { steps: 10, limit_reached: false });
        assert_eq!(io.board().rising_edges(pins.vertical_stepper_a.step.pin), 10);
        assert_eq!(io.board().rising_edges(pins.vertical_stepper_b.step.pin), 10);
        assert!(io.is_asserted(pins.vertical_stepper_a.dir));
        assert!(!io.is_asserted(pins.vertical_stepper_b.dir));
        assert_eq!(driver.position(), 10);

        // Every A edge has a B edge at the same instant
        let edges = |pin: u8| -> Vec<u64> {
            io.board()
                .writes()
                .iter()
                .filter(|w| w.pin == pin && w.level.is_high())
                .map(|w| w.at_us)
                .collect()
        };
        assert_eq!(
            edges(pins.vertical_stepper_a.step.pin),
            edges(pins.vertical_stepper_b.step.pin)
        );
    }

    #[test]
    fn test_stops_on_boundary_switch() {
        let (config, mut driver, mut limits) = setup();
        let pins = config.pins;
        let mut board = SimBoard::new();
        board.press_after_steps(pins.bottom_limit.pin, pins.vertical_stepper_a.step.pin, 30);
        let mut io = Io::new(board, None);

        let outcome = driver
            .move_vertical(&mut io, &mut limits, Direction::Down, 50, Profile::Ramped, |_, _| {})
            .unwrap();

        assert_eq!(outcome, MoveOutcome { steps: 30, limit_reached: true });
        assert_eq!(io.board().rising_edges(pins.vertical_stepper_a.step.pin), 30);
    }

    #[test]
    fn test_short_glitch_does_not_end_move() {
        let (config, mut driver, mut limits) = setup();
        let pins = config.pins;
        let mut board = SimBoard::new();
        board.press_between(pins.bottom_limit.pin, 5, 7);
        let mut io = Io::new(board, None);

        let outcome = driver
            .move_vertical(&mut io, &mut limits, Direction::Down, 50, Profile::Fixed(500), |_, _| {})
            .unwrap();

        assert_eq!(outcome, MoveOutcome { steps: 50, limit_reached: false });
        assert_eq!(driver.position(), 50);
        assert_eq!(limits.state(LimitSwitch::Bottom).level, crate::limits::SwitchLevel::Released);
    }

    #[test]
    fn test_measured_pass_slows_before_switch() {
        let (config, mut driver, mut limits) = setup();
        let v = config.pins.vertical_stepper_a;
        let v_step = usize::from(v.step.pin);
        let mut board = SimBoard::new();
        board.track_axis(v.step.pin, v.dir.pin);
        board.script(config.pins.top_limit.pin, move |p| p.travel[v_step] <= -40);
        board.script(config.pins.bottom_limit.pin, move |p| p.travel[v_step] >= 360);
        let mut io = Io::new(board, None);

        let mut pass = |io: &mut Io<SimBoard>, driver: &mut ActuatorDriver, direction: Direction| {
            let from = io.board().writes().len();
            let outcome = driver
                .move_vertical(io, &mut limits, direction, UNTIL_LIMIT, Profile::Ramped, |_, _| {})
                .unwrap();
            assert!(outcome.limit_reached);
            let edges: Vec<u64> = io.board().writes()[from..]
                .iter()
                .filter(|w| w.pin == v.step.pin && w.level.is_high())
                .map(|w| w.at_us)
                .collect();
            edges.windows(2).map(|w| w[1] - w[0]).collect::<Vec<u64>>()
        };

        // Height unknown: both runs seek at the start gap
        pass(&mut io, &mut driver, Direction::Up);
        let seek = pass(&mut io, &mut driver, Direction::Down);
        assert_eq!(driver.span(), Some(400));
        assert!(seek.iter().all(|&p| p == 2 * 1200));

        let periods = pass(&mut io, &mut driver, Direction::Up);
        assert_eq!(periods.len(), 399);
        let middle = periods[200];
        let tail = &periods[periods.len() - 5..];
        assert_eq!(middle, 2 * 100);
        assert!(tail.iter().all(|&p| p > 10 * middle), "tail {:?}", tail);
        assert_eq!(driver.position(), 0);
    }

    #[test]
    fn test_up_to_top_zeroes_position() {
        let (config, mut driver, mut limits) = setup();
        let pins = config.pins;
        let mut board = SimBoard::new();
        board.press_after_steps(pins.top_limit.pin, pins.vertical_stepper_a.step.pin, 12);
        let mut io = Io::new(board, None);

        let outcome = driver
            .move_vertical(&mut io, &mut limits, Direction::Up, UNTIL_LIMIT, Profile::Ramped, |_, _| {})
            .unwrap();

        assert_eq!(outcome.steps, 12);
        assert!(outcome.limit_reached);
        assert_eq!(driver.position(), 0);
    }

    #[test]
    fn test_on_step_sees_live_position() {
        let (_, mut driver, mut limits) = setup();
        let mut io = Io::new(SimBoard::new(), None);
        let mut seen = Vec::new();

        driver
            .move_vertical(&mut io, &mut limits, Direction::Down, 4, Profile::Fixed(500), |_, p| {
                seen.push(p)
            })
            .unwrap();

        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_wrong_axis_direction() {
        let (_, mut driver, mut limits) = setup();
        let mut io = Io::new(SimBoard::new(), None);

        assert_eq!(
            driver.move_horizontal(&mut io, &mut limits, Direction::Up, 5),
            Err(Fault::DirectionNotOnAxis(Direction::Up))
        );
        assert_eq!(
            driver.move_vertical(&mut io, &mut limits, Direction::Left, 5, Profile::Ramped, |_, _| {}),
            Err(Fault::DirectionNotOnAxis(Direction::Left))
        );
        assert!(io.board().writes().is_empty());
    }

    #[test]
    fn test_horizontal_single_stepper() {
        let (config, mut driver, mut limits) = setup();
        let pins = config.pins;
        let mut io = Io::new(SimBoard::new(), None);

        let outcome = driver
            .move_horizontal(&mut io, &mut limits, Direction::Left, 8)
            .unwrap();

        assert_eq!(outcome.steps, 8);
        assert_eq!(io.board().rising_edges(pins.horizontal_stepper.step.pin), 8);
        assert_eq!(io.board().rising_edges(pins.vertical_stepper_a.step.pin), 0);
        assert!(io.is_asserted(pins.horizontal_stepper.dir));
        assert_eq!(driver.position(), 0);
    }

    #[test]
    fn test_abort_stops_motion() {
        let (config, mut driver, mut limits) = setup();
        let mut board = SimBoard::new();
        board.press_between(6, 0, u64::MAX);
        let mut io = Io::new(board, Some(crate::config::PinConfig::new(6)));

        assert_eq!(
            driver.move_horizontal(&mut io, &mut limits, Direction::Right, 8),
            Err(Fault::OperatorAbort)
        );
        assert_eq!(io.board().rising_edges(config.pins.horizontal_stepper.step.pin), 0);
    }
}
