//! Spray zone selector
//!
//! Near the top of a stroke only the top gun fires, near the bottom only
//! the bottom gun, and both in between. The band is counted in vertical
//! gaps from the top switch.

use embedded_hal::delay::DelayNs;
use woodstain_hal::DigitalIo;

use crate::config::{MachineConfig, PinConfig, SprayConfig};
use crate::io::Io;

/// Which solenoids are open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SprayZone {
    TopOnly,
    BottomOnly,
    Both,
}

impl SprayZone {
    /// Zone for a stroke band
    pub fn for_position(band: u32, thresholds: &SprayConfig) -> Self {
        if band < thresholds.min {
            SprayZone::TopOnly
        } else if band > thresholds.max {
            SprayZone::BottomOnly
        } else {
            SprayZone::Both
        }
    }

    const fn outputs(self) -> (bool, bool) {
        match self {
            SprayZone::TopOnly => (true, false),
            SprayZone::BottomOnly => (false, true),
            SprayZone::Both => (true, true),
        }
    }
}

/// Band of a vertical step position
pub fn band_for_steps(position: i32, gap_steps: u32) -> u32 {
    position.max(0).unsigned_abs() / gap_steps.max(1)
}

/// Owner of the two solenoid lines
#[derive(Debug, Clone)]
pub struct SprayZoneSelector {
    top: PinConfig,
    bottom: PinConfig,
    thresholds: SprayConfig,
    gap_steps: u32,
    /// `None` also covers "both guns off"
    last_applied: Option<SprayZone>,
}

impl SprayZoneSelector {
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            top: config.pins.top_spray,
            bottom: config.pins.bottom_spray,
            thresholds: config.spray,
            gap_steps: config.stroke.vertical_gap_steps,
            last_applied: None,
        }
    }

    /// Zone most recently written to the solenoids
    pub fn last_applied(&self) -> Option<SprayZone> {
        self.last_applied
    }

    /// Select the zone for a band and drive the solenoids if it changed
    pub fn update<B: DigitalIo + DelayNs>(&mut self, io: &mut Io<B>, band: u32) -> SprayZone {
        let zone = SprayZone::for_position(band, &self.thresholds);
        if self.last_applied != Some(zone) {
            let (top, bottom) = zone.outputs();
            io.set(self.top, top);
            io.set(self.bottom, bottom);
            self.last_applied = Some(zone);
            debug!("Spray zone {} at band {}", zone, band);
        }
        zone
    }

    /// Select the zone for a vertical step position
    pub fn update_for_steps<B: DigitalIo + DelayNs>(
        &mut self,
        io: &mut Io<B>,
        position: i32,
    ) -> SprayZone {
        self.update(io, band_for_steps(position, self.gap_steps))
    }

    /// Close both solenoids
    pub fn turn_off<B: DigitalIo + DelayNs>(&mut self, io: &mut Io<B>) {
        io.set(self.top, false);
        io.set(self.bottom, false);
        self.last_applied = None;
    }

    /// Forget the cached zone after the halt cascade closed the solenoids
    pub(crate) fn forget(&mut self) {
        self.last_applied = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBoard;
    use proptest::prelude::*;

    #[test]
    fn test_boundaries() {
        let t = SprayConfig { min: 2, max: 15 };
        assert_eq!(SprayZone::for_position(1, &t), SprayZone::TopOnly);
        assert_eq!(SprayZone::for_position(2, &t), SprayZone::Both);
        assert_eq!(SprayZone::for_position(15, &t), SprayZone::Both);
        assert_eq!(SprayZone::for_position(16, &t), SprayZone::BottomOnly);
    }

    #[test]
    fn test_band_for_steps() {
        assert_eq!(band_for_steps(-50, 3000), 0);
        assert_eq!(band_for_steps(2999, 3000), 0);
        assert_eq!(band_for_steps(3000, 3000), 1);
        assert_eq!(band_for_steps(45_000, 3000), 15);
    }

    #[test]
    fn test_selector_writes_only_on_change() {
        let config = MachineConfig::default();
        let mut selector = SprayZoneSelector::new(&config);
        let mut io = Io::new(SimBoard::new(), None);

        assert_eq!(selector.update(&mut io, 0), SprayZone::TopOnly);
        assert!(io.is_asserted(config.pins.top_spray));
        assert!(!io.is_asserted(config.pins.bottom_spray));
        let writes = io.board().writes().len();

        selector.update(&mut io, 1);
        assert_eq!(io.board().writes().len(), writes);

        assert_eq!(selector.update(&mut io, 5), SprayZone::Both);
        assert!(io.is_asserted(config.pins.bottom_spray));
        assert_eq!(selector.last_applied(), Some(SprayZone::Both));

        selector.turn_off(&mut io);
        assert!(!io.is_asserted(config.pins.top_spray));
        assert!(!io.is_asserted(config.pins.bottom_spray));
        assert_eq!(selector.last_applied(), None);
    }

    proptest! {
        #[test]
        fn prop_zone_is_band_function(band in 0u32..100, min in 0u32..50, span in 0u32..50) {
            let t = SprayConfig { min, max: min + span };
            let zone = SprayZone::for_position(band, &t);
            let expected = if band < t.min {
                SprayZone::TopOnly
            } else if band > t.max {
                SprayZone::BottomOnly
            } else {
                SprayZone::Both
            };
            prop_assert_eq!(zone, expected);
            prop_assert_eq!(zone, SprayZone::for_position(band, &t));
        }
    }
}
