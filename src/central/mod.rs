//! Central branch config: durable per-branch workflow metadata

pub mod entry;
pub mod properties;
pub mod store;

pub use entry::BranchCentralConfig;
pub use store::{CentralConfigStore, CONFIG_COMMIT_MESSAGE};
