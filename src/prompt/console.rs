//! Interactive prompts on a terminal

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::io::{stdin, stdout, BufRead, BufReader, Stdin, Stdout, Write};

use super::Prompter;

pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(stdin()), stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, parameter: &str, label: &str) -> Result<String> {
        write!(self.output, "{} ", label.bold())?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .with_context(|| format!("Failed to read answer for '{parameter}'"))?;
        if read == 0 {
            bail!("No input received for '{parameter}'");
        }
        Ok(line.trim().to_string())
    }

    fn ask_choice(
        &mut self,
        parameter: &str,
        question: &str,
        choices: &[&str],
        default: Option<&str>,
    ) -> Result<String> {
        let options = choices.join("/");
        let label = match default {
            Some(default) => format!("{question} ({options}) [{default}]:"),
            None => format!("{question} ({options}):"),
        };

        loop {
            let answer = self.ask(parameter, &label)?;
            if answer.is_empty() {
                if let Some(default) = default {
                    return Ok(default.to_string());
                }
            }
            if let Some(choice) = choices.iter().find(|c| c.eq_ignore_ascii_case(&answer)) {
                return Ok(choice.to_string());
            }
            writeln!(self.output, "Invalid response. Please enter one of: {options}")?;
        }
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn prompt(&mut self, parameter: &str, question: &str) -> Result<String> {
        loop {
            let answer = self.ask(parameter, &format!("{question}:"))?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            writeln!(self.output, "A value is required.")?;
        }
    }

    fn prompt_default(&mut self, parameter: &str, question: &str, default: &str) -> Result<String> {
        let answer = self.ask(parameter, &format!("{question} [{default}]:"))?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    fn choose(&mut self, parameter: &str, question: &str, choices: &[&str]) -> Result<String> {
        self.ask_choice(parameter, question, choices, None)
    }

    fn choose_default(
        &mut self,
        parameter: &str,
        question: &str,
        choices: &[&str],
        default: &str,
    ) -> Result<String> {
        self.ask_choice(parameter, question, choices, Some(default))
    }

    fn password(&mut self, parameter: &str, question: &str) -> Result<String> {
        self.prompt(parameter, question)
    }
}
