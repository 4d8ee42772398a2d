//! Build backend driven by shell command templates
//!
//! Templates may use `{version}`, `{name}` and `{value}`; substituted values
//! are shell-escaped.

use anyhow::Result;
use shell_escape::escape;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use super::{run_shell, ExecutedCommand, ProjectBuild};
use crate::config::BuildSettings;
use crate::error::FlowError;

pub struct CommandBuild {
    root: PathBuf,
    settings: BuildSettings,
}

impl CommandBuild {
    pub fn new(repo_root: &Path, settings: &BuildSettings) -> Self {
        Self {
            root: repo_root.to_path_buf(),
            settings: settings.clone(),
        }
    }

    fn template<'s>(&self, template: &'s Option<String>, key: &str) -> Result<&'s str> {
        template.as_deref().ok_or_else(|| {
            FlowError::ToolFailed {
                tool: "build".to_string(),
                command: key.to_string(),
                stderr: format!("build.{key} is not configured"),
            }
            .into()
        })
    }

    /// Run a query command and return its trimmed stdout.
    fn query(&self, command: &str) -> Result<String> {
        let executed = run_shell(command, &self.root)?;
        if !executed.success {
            return Err(failed(&executed).into());
        }
        Ok(executed.output.trim().to_string())
    }

    /// Run a mutating command; failures are errors.
    fn apply(&self, command: &str) -> Result<ExecutedCommand> {
        let executed = run_shell(command, &self.root)?;
        if !executed.success {
            return Err(failed(&executed).into());
        }
        Ok(executed)
    }
}

fn failed(executed: &ExecutedCommand) -> FlowError {
    FlowError::ToolFailed {
        tool: "build".to_string(),
        command: executed.command.clone(),
        stderr: executed.output.trim().to_string(),
    }
}

fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |command, (name, value)| {
        command.replace(&format!("{{{name}}}"), &escape(Cow::Borrowed(*value)))
    })
}

impl ProjectBuild for CommandBuild {
    fn version(&self) -> Result<String> {
        let template = self.template(&self.settings.version_command, "version_command")?;
        self.query(template)
    }

    fn set_version(&mut self, version: &str) -> Result<ExecutedCommand> {
        let template = self.template(&self.settings.set_version_command, "set_version_command")?;
        self.apply(&fill(template, &[("version", version)]))
    }

    fn property(&self, name: &str) -> Result<Option<String>> {
        let Some(template) = self.settings.property_command.as_deref() else {
            return Ok(None);
        };
        let executed = run_shell(&fill(template, &[("name", name)]), &self.root)?;
        let value = executed.output.trim();
        if !executed.success || value.is_empty() {
            return Ok(None);
        }
        Ok(Some(value.to_string()))
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<ExecutedCommand> {
        let template =
            self.template(&self.settings.set_property_command, "set_property_command")?;
        self.apply(&fill(template, &[("name", name), ("value", value)]))
    }

    fn install(&mut self) -> Result<ExecutedCommand> {
        match self.settings.install_command.as_deref() {
            Some(command) => run_shell(command, &self.root),
            None => Ok(ExecutedCommand::ok("install (no install command configured)")),
        }
    }
}
