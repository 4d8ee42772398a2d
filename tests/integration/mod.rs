//! End-to-end goal runs against throwaway repositories
//!
//! Every test drives goals through `commands::execute` on a working
//! repository with a bare `origin`, like a user on the command line would.

pub mod aborts;
pub mod central_config;
pub mod feature_finish;
pub mod feature_start;
pub mod helpers;
pub mod release;
pub mod reset;
pub mod resume;
pub mod update;
