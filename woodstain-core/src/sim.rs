//! Simulated board for tests
//!
//! Keeps simulated time advanced only by delays, records every output
//! write, counts rising edges per pin and drives inputs from scripts.
//! Step pins registered with [`SimBoard::track_axis`] also keep a signed
//! travel count, so scripts can model switches at physical positions.

use embedded_hal::delay::DelayNs;
use woodstain_hal::{DigitalIo, Level};

use crate::config::PinConfig;

const PINS: usize = 32;

/// What an input script can observe
pub struct Snapshot {
    pub now_us: u64,
    pub rising: [u32; PINS],
    /// Per tracked step pin: +1 per step with the direction line high
    pub travel: [i64; PINS],
}

type Script = Box<dyn Fn(&Snapshot) -> bool>;

/// One recorded output write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    pub at_us: u64,
    pub pin: u8,
    pub level: Level,
}

pub struct SimBoard {
    now_ns: u64,
    seen: Snapshot,
    outputs: [Level; PINS],
    writes: Vec<PinWrite>,
    dir_of: [Option<u8>; PINS],
    /// Input scripts; several scripts on one pin are OR-ed
    scripts: Vec<(u8, Script)>,
    exclusive: Option<(u8, u8)>,
    violated: bool,
}

impl SimBoard {
    pub fn new() -> Self {
        Self {
            now_ns: 0,
            seen: Snapshot {
                now_us: 0,
                rising: [0; PINS],
                travel: [0; PINS],
            },
            outputs: [Level::Low; PINS],
            writes: Vec::new(),
            dir_of: [None; PINS],
            scripts: Vec::new(),
            exclusive: None,
            violated: false,
        }
    }

    /// Drive `pin` high while `f` holds
    pub fn script(&mut self, pin: u8, f: impl Fn(&Snapshot) -> bool + 'static) {
        self.scripts.push((pin, Box::new(f)));
    }

    /// Drive `pin` high in `[from_ms, until_ms)`
    pub fn press_between(&mut self, pin: u8, from_ms: u64, until_ms: u64) {
        let from = from_ms.saturating_mul(1000);
        let until = until_ms.saturating_mul(1000);
        self.script(pin, move |p| p.now_us >= from && p.now_us < until);
    }

    /// Drive `pin` high once `step_pin` has seen `steps` rising edges
    pub fn press_after_steps(&mut self, pin: u8, step_pin: u8, steps: u32) {
        self.script(pin, move |p| p.rising[usize::from(step_pin)] >= steps);
    }

    /// Count signed travel on `step_pin` using `dir_pin`
    pub fn track_axis(&mut self, step_pin: u8, dir_pin: u8) {
        self.dir_of[usize::from(step_pin)] = Some(dir_pin);
    }

    /// Flag any instant where both pins are high
    pub fn watch_exclusive(&mut self, a: u8, b: u8) {
        self.exclusive = Some((a, b));
    }

    pub fn exclusive_violated(&self) -> bool {
        self.violated
    }

    /// Current output level of a pin
    pub fn level(&self, pin: u8) -> Level {
        self.outputs[usize::from(pin)]
    }

    /// Logical state of an output, honoring inversion
    pub fn is_asserted(&self, pin: PinConfig) -> bool {
        self.level(pin.pin).is_high() != pin.inverted
    }

    pub fn writes(&self) -> &[PinWrite] {
        &self.writes
    }

    pub fn rising_edges(&self, pin: u8) -> u32 {
        self.seen.rising[usize::from(pin)]
    }

    pub fn travel(&self, step_pin: u8) -> i64 {
        self.seen.travel[usize::from(step_pin)]
    }

    pub fn now_us(&self) -> u64 {
        self.now_ns / 1000
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ns / 1_000_000
    }

    fn advance(&mut self, ns: u64) {
        self.now_ns += ns;
        self.seen.now_us = self.now_ns / 1000;
    }
}

impl DigitalIo for SimBoard {
    fn read_pin(&mut self, pin: u8) -> Level {
        let mut scripted = self.scripts.iter().filter(|(p, _)| *p == pin).peekable();
        if scripted.peek().is_none() {
            return self.outputs[usize::from(pin)];
        }
        Level::from_bool(scripted.any(|(_, f)| f(&self.seen)))
    }

    fn write_pin(&mut self, pin: u8, level: Level) {
        let idx = usize::from(pin);
        if self.outputs[idx] == Level::Low && level == Level::High {
            self.seen.rising[idx] += 1;
            if let Some(dir) = self.dir_of[idx] {
                self.seen.travel[idx] += if self.level(dir).is_high() { 1 } else { -1 };
            }
        }
        self.outputs[idx] = level;
        self.writes.push(PinWrite {
            at_us: self.now_us(),
            pin,
            level,
        });
        if let Some((a, b)) = self.exclusive {
            if self.level(a).is_high() && self.level(b).is_high() {
                self.violated = true;
            }
        }
    }
}

impl DelayNs for SimBoard {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(u64::from(us) * 1000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms) * 1_000_000);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_are_ored() {
        let mut board = SimBoard::new();
        board.press_between(3, 0, 1);
        board.press_between(3, 5, 6);
        assert!(board.read_pin(3).is_high());
        board.delay_ms(2);
        assert!(!board.read_pin(3).is_high());
        board.delay_ms(3);
        assert!(board.read_pin(3).is_high());
    }

    #[test]
    fn test_travel_follows_direction() {
        let mut board = SimBoard::new();
        board.track_axis(12, 13);
        board.write_pin(13, Level::High);
        for _ in 0..3 {
            board.write_pin(12, Level::High);
            board.write_pin(12, Level::Low);
        }
        board.write_pin(13, Level::Low);
        board.write_pin(12, Level::High);
        assert_eq!(board.travel(12), 2);
        assert_eq!(board.rising_edges(12), 4);
    }
}
