//! Debounce and edge monitor
//!
//! Blocking waits on the limit switches. A reading is accepted only after
//! it has stayed stable for the whole debounce window; a bounce restarts
//! the wait. Ambiguity (both opposing switches pressed) is a fault, never
//! a guess.

use embedded_hal::delay::DelayNs;
use woodstain_hal::DigitalIo;

use super::{LimitSwitch, SwitchLevel, SwitchState};
use crate::config::{PinConfig, PinMap, TimingConfig};
use crate::io::Io;
use crate::safety::Fault;

/// Owner of the switch states
#[derive(Debug, Clone)]
pub struct LimitMonitor {
    /// Indexed Top, Bottom, Left, Right
    pins: [PinConfig; 4],
    states: [SwitchState; 4],
    debounce_ms: u32,
    poll_ms: u32,
}

impl LimitMonitor {
    /// Create a monitor with every switch assumed released
    pub fn new(pins: &PinMap, timing: &TimingConfig) -> Self {
        Self {
            pins: [
                pins.top_limit,
                pins.bottom_limit,
                pins.left_limit,
                pins.right_limit,
            ],
            states: [SwitchState::default(); 4],
            debounce_ms: timing.debounce_ms,
            poll_ms: timing.poll_interval_ms.max(1),
        }
    }

    /// Last accepted state of a switch
    pub fn state(&self, switch: LimitSwitch) -> SwitchState {
        self.states[switch.index()]
    }

    /// Raw, undebounced sample
    pub fn is_pressed<B: DigitalIo + DelayNs>(&self, io: &mut Io<B>, switch: LimitSwitch) -> bool {
        io.is_asserted(self.pins[switch.index()])
    }

    /// Block until `switch` is pressed and stable
    ///
    /// The switch must be released when the call starts.
    pub fn wait_press<B: DigitalIo + DelayNs>(
        &mut self,
        io: &mut Io<B>,
        switch: LimitSwitch,
    ) -> Result<(), Fault> {
        if self.is_pressed(io, switch) {
            return Err(Fault::SwitchAlreadyPressed(switch));
        }
        self.settle(io, switch, SwitchLevel::Pressed)
    }

    /// Block until `switch` is released and stable
    ///
    /// The switch must be pressed when the call starts.
    pub fn wait_release<B: DigitalIo + DelayNs>(
        &mut self,
        io: &mut Io<B>,
        switch: LimitSwitch,
    ) -> Result<(), Fault> {
        if !self.is_pressed(io, switch) {
            return Err(Fault::SwitchNotPressed(switch));
        }
        self.settle(io, switch, SwitchLevel::Released)
    }

    /// Release, press again, release again: one full back-and-forth
    pub fn wait_second_release<B: DigitalIo + DelayNs>(
        &mut self,
        io: &mut Io<B>,
        switch: LimitSwitch,
    ) -> Result<(), Fault> {
        self.wait_release(io, switch)?;
        self.wait_press(io, switch)?;
        self.wait_release(io, switch)
    }

    /// Block until exactly one of two switches is pressed, then released
    ///
    /// Returns the switch that was pressed. Both switches must be released
    /// when the call starts, and seeing both pressed inside one debounce
    /// window is a mechanical fault.
    pub fn wait_for_press<B: DigitalIo + DelayNs>(
        &mut self,
        io: &mut Io<B>,
        a: LimitSwitch,
        b: LimitSwitch,
    ) -> Result<LimitSwitch, Fault> {
        for switch in [a, b] {
            if self.is_pressed(io, switch) {
                return Err(Fault::SwitchAlreadyPressed(switch));
            }
        }
        debug!("Waiting for {} or {} to be pressed", a, b);

        loop {
            let (candidate, other) = loop {
                io.check_abort()?;
                match (self.is_pressed(io, a), self.is_pressed(io, b)) {
                    (true, true) => return Err(Fault::BothLimitsPressed(a, b)),
                    (true, false) => break (a, b),
                    (false, true) => break (b, a),
                    (false, false) => io.sleep_ms(self.poll_ms),
                }
            };

            let mut stable = true;
            let mut elapsed = 0;
            while elapsed < self.debounce_ms {
                self.poll(io)?;
                elapsed += self.poll_ms;
                if self.is_pressed(io, other) {
                    return Err(Fault::BothLimitsPressed(a, b));
                }
                if !self.is_pressed(io, candidate) {
                    stable = false;
                    break;
                }
            }

            if stable {
                self.record(io, candidate, SwitchLevel::Pressed);
                self.settle(io, candidate, SwitchLevel::Released)?;
                return Ok(candidate);
            }
            trace!("Bounce on {}, waiting again", candidate);
        }
    }

    /// Hold a raw press for one debounce window before accepting it
    ///
    /// Returns `false` if the switch lets go inside the window; the
    /// recorded state is left untouched in that case.
    pub fn confirm_press<B: DigitalIo + DelayNs>(
        &mut self,
        io: &mut Io<B>,
        switch: LimitSwitch,
    ) -> Result<bool, Fault> {
        let mut elapsed = 0;
        while elapsed < self.debounce_ms {
            self.poll(io)?;
            elapsed += self.poll_ms;
            if !self.is_pressed(io, switch) {
                trace!("Glitch on {} ignored", switch);
                return Ok(false);
            }
        }
        self.record(io, switch, SwitchLevel::Pressed);
        Ok(true)
    }

    /// Poll until the raw reading equals `target` for a full debounce window
    fn settle<B: DigitalIo + DelayNs>(
        &mut self,
        io: &mut Io<B>,
        switch: LimitSwitch,
        target: SwitchLevel,
    ) -> Result<(), Fault> {
        let want = target == SwitchLevel::Pressed;
        let mut stable_ms = 0;
        let mut seen = false;

        loop {
            io.check_abort()?;
            if self.is_pressed(io, switch) == want {
                if seen && stable_ms >= self.debounce_ms {
                    self.record(io, switch, target);
                    return Ok(());
                }
                if seen {
                    stable_ms += self.poll_ms;
                }
                seen = true;
            } else {
                seen = false;
                stable_ms = 0;
            }
            io.sleep_ms(self.poll_ms);
        }
    }

    fn poll<B: DigitalIo + DelayNs>(&self, io: &mut Io<B>) -> Result<(), Fault> {
        io.sleep_ms(self.poll_ms);
        io.check_abort()
    }

    fn record<B: DigitalIo + DelayNs>(&mut self, io: &Io<B>, switch: LimitSwitch, level: SwitchLevel) {
        debug!("{} limit {}", switch, level);
        self.states[switch.index()] = SwitchState {
            level,
            last_transition_ms: io.now_ms(),
        };
    }
}
