//! Non-interactive mode: every question is a missing parameter unless it
//! has a default

use anyhow::Result;

use super::Prompter;
use crate::error::FlowError;

#[derive(Debug, Default)]
pub struct BatchPrompter;

impl BatchPrompter {
    fn missing(parameter: &str) -> anyhow::Error {
        FlowError::MissingParameter {
            parameter: parameter.to_string(),
        }
        .into()
    }
}

impl Prompter for BatchPrompter {
    fn prompt(&mut self, parameter: &str, _question: &str) -> Result<String> {
        Err(Self::missing(parameter))
    }

    fn prompt_default(&mut self, _parameter: &str, _question: &str, default: &str) -> Result<String> {
        Ok(default.to_string())
    }

    fn choose(&mut self, parameter: &str, _question: &str, _choices: &[&str]) -> Result<String> {
        Err(Self::missing(parameter))
    }

    fn choose_default(
        &mut self,
        _parameter: &str,
        _question: &str,
        _choices: &[&str],
        default: &str,
    ) -> Result<String> {
        Ok(default.to_string())
    }

    fn password(&mut self, parameter: &str, _question: &str) -> Result<String> {
        Err(Self::missing(parameter))
    }
}
