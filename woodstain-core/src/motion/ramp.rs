//! Step delay profiles
//!
//! A ramped move starts at `start_gap_us` (slow, high torque), shortens the
//! delay by `ramp_step_us` per step down to the `min_delay_us` floor, and
//! mirrors that on the way out so the last steps are slow again. The delay
//! of a step is a pure function of its index and the move length. Steps
//! past the planned length crawl at the start gap, and a move of unknown
//! length seeks its switch at the start gap throughout.

use crate::config::RampConfig;

/// Delay schedule of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
    /// Same delay for every step (µs)
    Fixed(u32),
    /// Accelerate from the start gap, decelerate back before the end
    Ramped,
}

impl Profile {
    /// Delay for step `index` of a `total`-step move
    pub fn delay_for(&self, ramp: &RampConfig, index: u32, total: u32) -> u32 {
        match *self {
            Profile::Fixed(delay_us) => delay_us,
            Profile::Ramped => ramped_delay(ramp, index, total),
        }
    }

    /// Delay for every step of a move whose length is unknown
    pub fn seek_delay(&self, ramp: &RampConfig) -> u32 {
        match *self {
            Profile::Fixed(delay_us) => delay_us,
            Profile::Ramped => ramp.start_gap_us,
        }
    }
}

/// Steps needed to accelerate from the start gap to the floor
pub fn accel_steps(ramp: &RampConfig) -> u32 {
    let span = ramp.start_gap_us.saturating_sub(ramp.min_delay_us);
    span.div_ceil(ramp.ramp_step_us.max(1))
}

fn ramped_delay(ramp: &RampConfig, index: u32, total: u32) -> u32 {
    let last = total.saturating_sub(1);
    let from_edge = index.min(last.saturating_sub(index));
    let span = ramp.start_gap_us.saturating_sub(ramp.min_delay_us);
    let cut = from_edge.saturating_mul(ramp.ramp_step_us).min(span);
    ramp.start_gap_us - cut
}
