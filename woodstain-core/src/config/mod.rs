//! Configuration types
//!
//! Board-agnostic configuration loaded once at startup, either from the
//! defaults below or from a `machine.toml` parsed by [`parse_config`].

pub mod parse;
pub mod pins;
pub mod types;

pub use parse::{parse_config, ParseError, ParseErrorKind};
pub use pins::{PinConfig, PinMap, StepperPins, GPIO_COUNT};
pub use types::*;
