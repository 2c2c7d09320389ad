//! RP2040-specific HAL for the paint head controller
//!
//! Implements the `woodstain-hal` boundary on the RP2040:
//!
//! - GPIO allocation by number for config-driven wiring
//! - A board that owns every configured line as a `Flex` pin and
//!   provides blocking delays from `embassy-time`

#![no_std]

pub mod board;
pub mod pins;

pub use board::RpBoard;
pub use pins::{PinBank, PinError};
