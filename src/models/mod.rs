pub mod branch;
pub mod goal;

pub use branch::{issue_key_of, BranchDescriptor, BranchType};
pub use goal::Goal;
