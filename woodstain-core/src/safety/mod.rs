//! Safety halt cascade
//!
//! Every fatal condition is a [`Fault`]. The controller routes each one
//! through [`halt::cascade`], which de-energizes all actuators and latches
//! the output gate, then reports [`Halted`] to the caller.

pub mod fault;
pub mod halt;

pub use fault::{Fault, Halted};
pub use halt::StatusBlink;
