//! Breakpoint / resume state machine
//!
//! A breakpoint is written before every step that can stop half-way and is
//! the only authority for "an operation is in progress on this branch".

pub mod kind;
pub mod machine;
pub mod step;
pub mod store;

pub use kind::{Breakpoint, VersionState};
pub use machine::{resume_decision, Ambient, ResumeDecision, RunState, StepMachine};
pub use step::{Category, Operation, Phase, Step};
pub use store::BreakpointStore;
