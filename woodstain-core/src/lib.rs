//! Board-agnostic core logic for the wood-staining paint head
//!
//! This crate contains the motion-and-safety controller. It talks to the
//! hardware only through [`woodstain_hal::DigitalIo`] and
//! `embedded_hal::delay::DelayNs`:
//!
//! - Limit switch debouncing and race resolution
//! - Step pulse generation with velocity ramping
//! - Dual-stepper vertical drive and single-stepper horizontal drive
//! - Induction motor interlock with mandatory cool-down
//! - Spray zone selection
//! - The halt cascade every fault converges on
//! - Configuration types and the `machine.toml` parser
//! - The paint program (homing and stroking)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod config;
pub mod controller;
pub mod interlock;
pub mod io;
pub mod limits;
pub mod motion;
pub mod program;
pub mod safety;
pub mod spray;
pub mod state;

#[cfg(test)]
mod sim;

pub use controller::Controller;
pub use program::{PaintProgram, ProgramReport};
pub use safety::{Fault, Halted};
