//! Controller state machine
//!
//! Defines which phase the paint head is in. The machine is explicit,
//! finite and deterministic, and `Halted` is terminal within one power
//! cycle.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::MotionState;
