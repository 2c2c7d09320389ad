//! Gated access to the board
//!
//! Every component drives the hardware through [`Io`]. It translates
//! logical assertion into electrical levels (honoring inverted pins),
//! keeps a running clock of the time spent in blocking delays, samples the
//! operator abort input, and drops output writes once the halt cascade has
//! latched.

use embedded_hal::delay::DelayNs;
use woodstain_hal::{DigitalIo, Level};

use crate::config::PinConfig;
use crate::safety::Fault;

/// Board wrapper shared by all components of one controller
pub struct Io<B> {
    board: B,
    /// Time spent in blocking delays since construction (µs)
    elapsed_us: u64,
    /// Set by the halt cascade; gated writes become no-ops
    latched: bool,
    abort: Option<PinConfig>,
}

impl<B: DigitalIo + DelayNs> Io<B> {
    /// Wrap a board
    pub fn new(board: B, abort: Option<PinConfig>) -> Self {
        Self {
            board,
            elapsed_us: 0,
            latched: false,
            abort,
        }
    }

    /// Check if a line is logically asserted
    pub fn is_asserted(&mut self, pin: PinConfig) -> bool {
        self.board.read_pin(pin.pin).is_high() != pin.inverted
    }

    /// Assert or deassert an output line
    ///
    /// Ignored once the halt cascade has latched.
    pub fn set(&mut self, pin: PinConfig, asserted: bool) {
        if self.latched {
            return;
        }
        self.drive(pin, asserted);
    }

    /// Drive an output regardless of the halt latch
    ///
    /// Only the halt cascade and the status indicator use this.
    pub(crate) fn drive(&mut self, pin: PinConfig, asserted: bool) {
        self.board
            .write_pin(pin.pin, Level::from_bool(asserted != pin.inverted));
    }

    /// Blocking delay in microseconds
    pub fn sleep_us(&mut self, us: u32) {
        self.board.delay_us(us);
        self.elapsed_us += u64::from(us);
    }

    /// Blocking delay in milliseconds
    pub fn sleep_ms(&mut self, ms: u32) {
        self.board.delay_ms(ms);
        self.elapsed_us += u64::from(ms) * 1000;
    }

    /// Milliseconds spent in blocking delays
    pub fn now_ms(&self) -> u64 {
        self.elapsed_us / 1000
    }

    /// Fail with `OperatorAbort` if the abort input is asserted
    pub fn check_abort(&mut self) -> Result<(), Fault> {
        if let Some(pin) = self.abort {
            if self.is_asserted(pin) {
                return Err(Fault::OperatorAbort);
            }
        }
        Ok(())
    }

    /// Stop honoring gated writes
    pub(crate) fn latch(&mut self) {
        self.latched = true;
    }

    /// Check if the halt latch is set
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn board(&self) -> &B {
        &self.board
    }
}
