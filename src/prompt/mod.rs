//! Prompt gateway
//!
//! Engines decide what is asked, in which order, with which default and
//! which allowed answers. Every question names the parameter that answers it
//! so batch mode can report exactly which `-D` property is missing.

mod batch;
mod console;
mod scripted;

use anyhow::Result;

pub use batch::BatchPrompter;
pub use console::ConsolePrompter;
pub use scripted::ScriptedPrompter;

pub trait Prompter {
    /// Free text answer.
    fn prompt(&mut self, parameter: &str, question: &str) -> Result<String>;

    /// Free text answer; an empty answer selects `default`.
    fn prompt_default(&mut self, parameter: &str, question: &str, default: &str) -> Result<String>;

    /// One of `choices`.
    fn choose(&mut self, parameter: &str, question: &str, choices: &[&str]) -> Result<String>;

    /// One of `choices`; an empty answer selects `default`.
    fn choose_default(
        &mut self,
        parameter: &str,
        question: &str,
        choices: &[&str],
        default: &str,
    ) -> Result<String>;

    fn password(&mut self, parameter: &str, question: &str) -> Result<String>;
}
