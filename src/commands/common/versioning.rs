//! Project version changes and installs, recorded in the command log

use anyhow::Result;
use std::collections::BTreeMap;
use tracing::info;

use super::output::warn;
use super::FlowContext;
use crate::error::FlowError;
use crate::project::ExecutedCommand;
use crate::version::VersionCommandResolver;

/// `@{...}` variables available to additional version commands.
#[derive(Debug, Clone, Default)]
pub struct VersionVariables {
    values: BTreeMap<String, String>,
}

impl VersionVariables {
    pub fn new(version: &str, current_version: &str) -> Self {
        let mut values = BTreeMap::new();
        values.insert("version".to_string(), version.to_string());
        values.insert("currentVersion".to_string(), current_version.to_string());
        Self { values }
    }

    pub fn with(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.values.insert(name.to_string(), value.to_string());
        }
        self
    }
}

impl FlowContext {
    pub fn project_version(&self) -> Result<String> {
        self.project.version()
    }

    /// Set the project version and the values of all additional version
    /// commands. Every value is resolved before anything is written.
    pub fn apply_version(&mut self, version: &str, variables: &VersionVariables) -> Result<()> {
        let values = {
            let resolver = VersionCommandResolver::new(
                &self.config.additional_version_commands,
                &variables.values,
                &self.properties,
                self.project.as_ref(),
            );
            resolver.resolve_all(self.prompter.as_mut())?
        };

        info!(version, "setting project version");
        let executed = self.project.set_version(version)?;
        self.record(executed)?;
        for (property, value) in values {
            let executed = self.project.set_property(&property, &value)?;
            self.record(executed)?;
        }
        Ok(())
    }

    /// Run the project install. Returns whether it succeeded.
    pub fn install(&mut self) -> Result<bool> {
        info!("installing project");
        let executed = self.project.install()?;
        if !executed.success {
            warn(&format!("'{}' failed", executed.command));
            if !executed.output.is_empty() {
                println!("{}", executed.output);
            }
        }
        let success = executed.success;
        self.log.record(executed);
        Ok(success)
    }

    fn record(&mut self, executed: ExecutedCommand) -> Result<()> {
        let failed = (!executed.success).then(|| FlowError::ToolFailed {
            tool: "build".to_string(),
            command: executed.command.clone(),
            stderr: executed.output.clone(),
        });
        self.log.record(executed);
        match failed {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}
