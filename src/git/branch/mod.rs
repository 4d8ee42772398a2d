//! Git branch management operations
//!
//! - `operations`: create, switch, delete, list
//! - `ancestry`: revision resolution, ancestry and commit ranges

mod ancestry;
mod operations;
