//! Woodstain Hardware Abstraction Layer
//!
//! This crate defines the digital I/O boundary that the controller core is
//! written against. Chip-specific crates (RP2040 today) implement it, and
//! host tests implement it with a simulated board.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  woodstain-core (motion + safety)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  woodstain-hal (this crate - traits)    │
//! │  + embedded_hal::delay::DelayNs         │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ woodstain-hal-│       │  simulated    │
//! │    rp2040     │       │  test board   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! Blocking delays are not redefined here: boards implement
//! `embedded_hal::delay::DelayNs` next to [`gpio::DigitalIo`].

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;

pub use gpio::{DigitalIo, Level};
