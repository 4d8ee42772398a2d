//! Prompter answering from a script, for tests and embedding

use anyhow::Result;
use std::collections::{BTreeMap, VecDeque};

use super::Prompter;
use crate::error::FlowError;

/// Answers questions by parameter name and records every question asked.
///
/// Unscripted questions behave like batch mode.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: BTreeMap<String, VecDeque<String>>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, parameter: &str, value: &str) -> Self {
        self.answers
            .entry(parameter.to_string())
            .or_default()
            .push_back(value.to_string());
        self
    }

    /// Parameters asked for, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    fn next(&mut self, parameter: &str, default: Option<&str>) -> Result<String> {
        self.asked.push(parameter.to_string());
        if let Some(answer) = self.answers.get_mut(parameter).and_then(VecDeque::pop_front) {
            return Ok(answer);
        }
        match default {
            Some(default) => Ok(default.to_string()),
            None => Err(FlowError::MissingParameter {
                parameter: parameter.to_string(),
            }
            .into()),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, parameter: &str, _question: &str) -> Result<String> {
        self.next(parameter, None)
    }

    fn prompt_default(&mut self, parameter: &str, _question: &str, default: &str) -> Result<String> {
        self.next(parameter, Some(default))
    }

    fn choose(&mut self, parameter: &str, _question: &str, _choices: &[&str]) -> Result<String> {
        self.next(parameter, None)
    }

    fn choose_default(
        &mut self,
        parameter: &str,
        _question: &str,
        _choices: &[&str],
        default: &str,
    ) -> Result<String> {
        self.next(parameter, Some(default))
    }

    fn password(&mut self, parameter: &str, _question: &str) -> Result<String> {
        self.next(parameter, None)
    }
}
