//! Motion-and-safety controller
//!
//! Single owner of the board and every component. All operations are
//! blocking. Any [`Fault`] raised by a component runs the halt cascade
//! here and comes back to the caller as [`Halted`]; after that every
//! operation fails immediately without touching the outputs.

use embedded_hal::delay::DelayNs;
use woodstain_hal::DigitalIo;

use crate::config::{MachineConfig, PinMap, StrokeConfig};
use crate::interlock::{Axis, Interlock};
use crate::io::Io;
use crate::limits::{LimitMonitor, LimitSwitch, SwitchState};
use crate::motion::{ActuatorDriver, Direction, MoveOutcome, Profile};
use crate::safety::{halt, Fault, Halted, StatusBlink};
use crate::spray::{SprayZone, SprayZoneSelector};
use crate::state::{Event, MotionState};

pub struct Controller<B> {
    io: Io<B>,
    pins: PinMap,
    stroke: StrokeConfig,
    limits: LimitMonitor,
    driver: ActuatorDriver,
    interlock: Interlock,
    spray: SprayZoneSelector,
    blink: StatusBlink,
    state: MotionState,
}

impl<B: DigitalIo + DelayNs> Controller<B> {
    /// Build the controller and drive every output to its safe level
    pub fn new(board: B, config: &MachineConfig) -> Self {
        let mut io = Io::new(board, config.pins.abort);
        for pin in config.pins.outputs() {
            io.set(pin, false);
        }

        Self {
            io,
            pins: config.pins,
            stroke: config.stroke,
            limits: LimitMonitor::new(&config.pins, &config.timing),
            driver: ActuatorDriver::new(config),
            interlock: Interlock::new(config),
            spray: SprayZoneSelector::new(config),
            blink: StatusBlink::new(config.pins.status_led, &config.timing),
            state: MotionState::Idle,
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Fault that halted the controller, if any
    pub fn halt_reason(&self) -> Option<Fault> {
        self.state.fault()
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_halted()
    }

    /// Vertical position in steps below the top switch
    pub fn position(&self) -> i32 {
        self.driver.position()
    }

    pub fn active_axis(&self) -> Axis {
        self.interlock.active()
    }

    pub fn stroke(&self) -> &StrokeConfig {
        &self.stroke
    }

    pub fn switch_state(&self, switch: LimitSwitch) -> SwitchState {
        self.limits.state(switch)
    }

    pub fn spray_zone(&self) -> Option<SprayZone> {
        self.spray.last_applied()
    }

    pub fn board(&self) -> &B {
        self.io.board()
    }

    // Limits

    /// Boundary switch of a raw direction code
    pub fn limit_for_code(&mut self, code: u8) -> Result<LimitSwitch, Halted> {
        self.ensure_running()?;
        let direction = Direction::from_code(code);
        let direction = self.guard(direction)?;
        Ok(LimitSwitch::for_direction(direction))
    }

    /// Raw sample of one switch
    pub fn is_pressed(&mut self, switch: LimitSwitch) -> Result<bool, Halted> {
        self.ensure_running()?;
        Ok(self.limits.is_pressed(&mut self.io, switch))
    }

    pub fn wait_press(&mut self, switch: LimitSwitch) -> Result<(), Halted> {
        self.ensure_running()?;
        let result = self.limits.wait_press(&mut self.io, switch);
        self.guard(result)
    }

    pub fn wait_release(&mut self, switch: LimitSwitch) -> Result<(), Halted> {
        self.ensure_running()?;
        let result = self.limits.wait_release(&mut self.io, switch);
        self.guard(result)
    }

    /// Wait for a full release, press, release cycle (manual jog confirm)
    pub fn wait_second_release(&mut self, switch: LimitSwitch) -> Result<(), Halted> {
        self.ensure_running()?;
        let result = self.limits.wait_second_release(&mut self.io, switch);
        self.guard(result)
    }

    pub fn wait_for_press(&mut self, a: LimitSwitch, b: LimitSwitch) -> Result<LimitSwitch, Halted> {
        self.ensure_running()?;
        let result = self.limits.wait_for_press(&mut self.io, a, b);
        self.guard(result)
    }

    pub fn wait_press_any_vertical(&mut self) -> Result<LimitSwitch, Halted> {
        self.wait_for_press(LimitSwitch::Top, LimitSwitch::Bottom)
    }

    pub fn wait_press_any_horizontal(&mut self) -> Result<LimitSwitch, Halted> {
        self.wait_for_press(LimitSwitch::Left, LimitSwitch::Right)
    }

    // Interlock

    /// Hand power to `axis` through the full de-energize and delay sequence
    pub fn set_active_axis(&mut self, axis: Axis) -> Result<(), Halted> {
        self.ensure_running()?;
        let result = self.interlock.set_active_axis(&mut self.io, axis);
        self.guard(result)
    }

    /// [`Controller::set_active_axis`] with a raw axis code
    pub fn set_active_axis_code(&mut self, code: u8) -> Result<(), Halted> {
        self.ensure_running()?;
        let axis = Axis::from_code(code);
        let axis = self.guard(axis)?;
        self.set_active_axis(axis)
    }

    pub fn turn_off_motors(&mut self) -> Result<(), Halted> {
        self.ensure_running()?;
        let result = self.interlock.turn_off_motors(&mut self.io);
        self.guard(result)
    }

    // Motion

    /// Move the vertical axis, energizing it first if needed
    pub fn move_vertical(
        &mut self,
        direction: Direction,
        steps: u32,
        profile: Profile,
    ) -> Result<MoveOutcome, Halted> {
        self.vertical(direction, steps, profile, false)
    }

    /// Vertical move that keeps the spray zone in step with the position
    ///
    /// The guns stay open at the end; call [`Controller::sprays_off`].
    pub fn paint_vertical(
        &mut self,
        direction: Direction,
        steps: u32,
        profile: Profile,
    ) -> Result<MoveOutcome, Halted> {
        self.vertical(direction, steps, profile, true)
    }

    /// Move the horizontal axis, energizing it first if needed
    pub fn move_horizontal(&mut self, direction: Direction, steps: u32) -> Result<MoveOutcome, Halted> {
        self.ensure_running()?;
        self.ensure_axis(direction, Axis::Horizontal)?;

        let standalone = self.begin_motion();
        let result = self
            .driver
            .move_horizontal(&mut self.io, &mut self.limits, direction, steps);
        let outcome = self.guard(result)?;
        self.end_motion(standalone);
        Ok(outcome)
    }

    fn vertical(
        &mut self,
        direction: Direction,
        steps: u32,
        profile: Profile,
        spraying: bool,
    ) -> Result<MoveOutcome, Halted> {
        self.ensure_running()?;
        self.ensure_axis(direction, Axis::Vertical)?;

        let standalone = self.begin_motion();
        if spraying {
            let position = self.driver.position();
            self.spray.update_for_steps(&mut self.io, position);
        }
        let spray = &mut self.spray;
        let result = self.driver.move_vertical(
            &mut self.io,
            &mut self.limits,
            direction,
            steps,
            profile,
            |io, position| {
                if spraying {
                    spray.update_for_steps(io, position);
                }
            },
        );
        let outcome = self.guard(result)?;
        self.end_motion(standalone);
        Ok(outcome)
    }

    // Spray

    /// Set the solenoids for a stroke band
    pub fn update_spray_zone(&mut self, band: u32) -> Result<SprayZone, Halted> {
        self.ensure_running()?;
        Ok(self.spray.update(&mut self.io, band))
    }

    pub fn sprays_off(&mut self) -> Result<(), Halted> {
        self.ensure_running()?;
        self.spray.turn_off(&mut self.io);
        Ok(())
    }

    // Halt

    /// Halt on operator request
    pub fn abort(&mut self) -> Halted {
        self.halt(Fault::OperatorAbort)
    }

    /// One status indicator cycle; does nothing unless halted
    pub fn blink_status(&mut self) {
        if self.is_halted() {
            self.blink.cycle(&mut self.io);
        }
    }

    /// Blink the status indicator until power is removed
    pub fn run_halted(&mut self) -> ! {
        loop {
            self.blink.cycle(&mut self.io);
        }
    }

    pub(crate) fn apply(&mut self, event: Event) {
        self.state = self.state.transition(event);
    }

    fn ensure_running(&self) -> Result<(), Halted> {
        match self.state.fault() {
            Some(reason) => Err(Halted { reason }),
            None => Ok(()),
        }
    }

    fn ensure_axis(&mut self, direction: Direction, axis: Axis) -> Result<(), Halted> {
        if direction.axis() != axis {
            return Err(self.halt(Fault::DirectionNotOnAxis(direction)));
        }
        if self.interlock.active() != axis {
            self.set_active_axis(axis)?;
        }
        Ok(())
    }

    /// A move started from `Idle` is a stroke of its own
    fn begin_motion(&mut self) -> bool {
        let standalone = self.state == MotionState::Idle;
        if standalone {
            self.apply(Event::StartStroke);
        }
        standalone
    }

    fn end_motion(&mut self, standalone: bool) {
        if standalone {
            self.apply(Event::StrokeComplete);
        }
    }

    fn guard<T>(&mut self, result: Result<T, Fault>) -> Result<T, Halted> {
        result.map_err(|fault| self.halt(fault))
    }

    fn halt(&mut self, fault: Fault) -> Halted {
        if let Some(reason) = self.state.fault() {
            return Halted { reason };
        }

        error!("Halt: {} ({})", fault.reason(), fault);
        halt::cascade(&mut self.io, &self.pins);
        self.interlock.forget();
        self.spray.forget();
        self.apply(Event::Fault(fault));
        Halted { reason: fault }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::UNTIL_LIMIT;
    use crate::sim::SimBoard;

    fn controller(board: SimBoard) -> (MachineConfig, Controller<SimBoard>) {
        let config = MachineConfig::default();
        let ctl = Controller::new(board, &config);
        (config, ctl)
    }

    #[test]
    fn test_new_drives_outputs_safe() {
        let (config, ctl) = controller(SimBoard::new());
        assert_eq!(ctl.state(), MotionState::Idle);
        assert_eq!(ctl.active_axis(), Axis::None);
        // Active-low enables sit high when disabled
        assert!(ctl.board().level(config.pins.horizontal_stepper.enable.pin).is_high());
        assert!(!ctl.board().level(config.pins.motor_power.pin).is_high());
    }

    #[test]
    fn test_move_stops_on_limit_without_halt() {
        let config = MachineConfig::default();
        let pins = config.pins;
        let mut board = SimBoard::new();
        board.press_after_steps(pins.bottom_limit.pin, pins.vertical_stepper_a.step.pin, 30);
        let mut ctl = Controller::new(board, &config);

        let outcome = ctl.move_vertical(Direction::Down, 50, Profile::Ramped).unwrap();

        assert_eq!(outcome, MoveOutcome { steps: 30, limit_reached: true });
        assert_eq!(ctl.board().rising_edges(pins.vertical_stepper_a.step.pin), 30);
        assert_eq!(ctl.board().rising_edges(pins.vertical_stepper_b.step.pin), 30);
        assert_eq!(ctl.state(), MotionState::Idle);
        assert!(!ctl.is_halted());
        assert_eq!(ctl.active_axis(), Axis::Vertical);
        assert_eq!(ctl.position(), 30);
    }

    #[test]
    fn test_same_axis_twice_takes_two_delays() {
        let (_, mut ctl) = controller(SimBoard::new());

        ctl.set_active_axis(Axis::Horizontal).unwrap();
        ctl.set_active_axis(Axis::Horizontal).unwrap();

        assert!(ctl.board().now_ms() >= 2 * 3000);
    }

    #[test]
    fn test_already_pressed_halts_without_blocking() {
        let mut board = SimBoard::new();
        board.press_between(2, 0, u64::MAX);
        let (config, mut ctl) = controller(board);

        let err = ctl.wait_press_any_vertical().unwrap_err();

        assert_eq!(err.reason, Fault::SwitchAlreadyPressed(LimitSwitch::Top));
        assert_eq!(err.reason.reason(), "switch already pressed");
        assert_eq!(ctl.board().now_us(), 0);
        assert!(ctl.is_halted());
        assert!(ctl.board().is_asserted(config.pins.status_led));
    }

    #[test]
    fn test_both_limits_halt() {
        let mut board = SimBoard::new();
        board.press_between(4, 5, 1000);
        board.press_between(5, 5, 1000);
        let (_, mut ctl) = controller(board);

        let err = ctl.wait_press_any_horizontal().unwrap_err();

        assert_eq!(err.reason.reason(), "both limits pressed");
        assert_eq!(
            ctl.halt_reason(),
            Some(Fault::BothLimitsPressed(LimitSwitch::Left, LimitSwitch::Right))
        );
    }

    #[test]
    fn test_unknown_codes_halt() {
        let (_, mut ctl) = controller(SimBoard::new());
        assert_eq!(ctl.limit_for_code(1), Ok(LimitSwitch::Bottom));
        assert_eq!(
            ctl.limit_for_code(7),
            Err(Halted { reason: Fault::UnknownDirection(7) })
        );
        assert_eq!(ctl.state(), MotionState::Halted(Fault::UnknownDirection(7)));

        let (_, mut ctl) = controller(SimBoard::new());
        assert_eq!(
            ctl.set_active_axis_code(9),
            Err(Halted { reason: Fault::UnknownAxis(9) })
        );
    }

    #[test]
    fn test_wrong_axis_direction_halts() {
        let (_, mut ctl) = controller(SimBoard::new());
        assert_eq!(
            ctl.move_horizontal(Direction::Down, 10),
            Err(Halted { reason: Fault::DirectionNotOnAxis(Direction::Down) })
        );
    }

    #[test]
    fn test_no_outputs_after_halt() {
        let (config, mut ctl) = controller(SimBoard::new());
        ctl.set_active_axis(Axis::Vertical).unwrap();
        ctl.update_spray_zone(5).unwrap();

        let halted = ctl.abort();
        assert_eq!(halted.reason, Fault::OperatorAbort);
        assert_eq!(ctl.active_axis(), Axis::None);
        for pin in [
            config.pins.motor_power,
            config.pins.vertical_select,
            config.pins.top_spray,
            config.pins.bottom_spray,
            config.pins.vertical_stepper_a.enable,
            config.pins.vertical_stepper_b.enable,
        ] {
            assert!(!ctl.board().is_asserted(pin));
        }

        let writes = ctl.board().writes().len();
        let now = ctl.board().now_us();
        assert!(ctl.move_vertical(Direction::Down, 10, Profile::Ramped).is_err());
        assert!(ctl.move_horizontal(Direction::Left, 10).is_err());
        assert!(ctl.set_active_axis(Axis::Horizontal).is_err());
        assert!(ctl.update_spray_zone(0).is_err());
        assert!(ctl.turn_off_motors().is_err());
        assert!(ctl.wait_press(LimitSwitch::Top).is_err());
        assert_eq!(ctl.board().writes().len(), writes);
        assert_eq!(ctl.board().now_us(), now);

        // Later faults keep the first reason
        assert_eq!(ctl.limit_for_code(9), Err(halted));
    }

    #[test]
    fn test_blink_only_while_halted() {
        let (config, mut ctl) = controller(SimBoard::new());
        let writes = ctl.board().writes().len();
        ctl.blink_status();
        assert_eq!(ctl.board().writes().len(), writes);

        ctl.abort();
        let start = ctl.board().now_us();
        let before = ctl.board().writes().len();
        ctl.blink_status();
        assert_eq!(ctl.board().now_us() - start, 600_000);
        let led: Vec<_> = ctl.board().writes()[before..]
            .iter()
            .filter(|w| w.pin == config.pins.status_led.pin)
            .map(|w| w.level.is_high())
            .collect();
        assert_eq!(led, vec![true, false]);
    }

    #[test]
    fn test_abort_input_halts_move() {
        let mut config = MachineConfig::default();
        config.pins.abort = Some(crate::config::PinConfig::new(6));
        let mut board = SimBoard::new();
        board.script(6, |p| p.rising[15] >= 5);
        let mut ctl = Controller::new(board, &config);

        let err = ctl
            .move_vertical(Direction::Down, UNTIL_LIMIT, Profile::Ramped)
            .unwrap_err();

        assert_eq!(err.reason, Fault::OperatorAbort);
        assert_eq!(ctl.board().rising_edges(15), 5);
        assert!(!ctl.board().is_asserted(config.pins.vertical_select));
    }

    #[test]
    fn test_paint_vertical_follows_position() {
        let mut config = MachineConfig::default();
        config.stroke.vertical_gap_steps = 10;
        let pins = config.pins;
        let mut ctl = Controller::new(SimBoard::new(), &config);

        ctl.paint_vertical(Direction::Down, 200, Profile::Fixed(200)).unwrap();

        // Band 20 is past the bottom threshold
        assert_eq!(ctl.spray_zone(), Some(SprayZone::BottomOnly));
        assert!(!ctl.board().is_asserted(pins.top_spray));
        assert!(ctl.board().is_asserted(pins.bottom_spray));
        assert_eq!(ctl.board().rising_edges(pins.top_spray.pin), 1);

        ctl.sprays_off().unwrap();
        assert!(!ctl.board().is_asserted(pins.bottom_spray));
    }
}
