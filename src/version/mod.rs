//! Version transition calculator

pub mod commands;
pub mod interpolate;
pub mod transition;

pub use commands::{check_cycles, VersionCommandResolver};
pub use transition::VersionTransitions;
