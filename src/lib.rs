pub mod breakpoint;
pub mod central;
pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod project;
pub mod prompt;
pub mod version;
