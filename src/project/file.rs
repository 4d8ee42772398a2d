//! `project.toml` descriptor backend
//!
//! ```toml
//! version = "1.0.0-SNAPSHOT"
//!
//! [properties]
//! "upstream.version" = "2.3.0"
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

use super::{run_shell, ExecutedCommand, ProjectBuild};
use crate::config::BuildSettings;
use crate::error::FlowError;

pub struct ProjectFile {
    root: PathBuf,
    path: PathBuf,
    install_command: Option<String>,
}

impl ProjectFile {
    pub fn new(repo_root: &Path, settings: &BuildSettings) -> Self {
        Self {
            root: repo_root.to_path_buf(),
            path: repo_root.join(&settings.project_file),
            install_command: settings.install_command.clone(),
        }
    }

    fn load(&self) -> Result<Table> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        content
            .parse::<Table>()
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    fn save(&self, table: &Table) -> Result<()> {
        let content = toml::to_string(table)
            .with_context(|| format!("Failed to serialize {}", self.path.display()))?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    fn edit_command(&self, what: &str) -> String {
        format!("update {what} in {}", self.path.display())
    }
}

impl ProjectBuild for ProjectFile {
    fn version(&self) -> Result<String> {
        let table = self.load()?;
        match table.get("version") {
            Some(Value::String(version)) => Ok(version.clone()),
            _ => Err(FlowError::ToolFailed {
                tool: "build".to_string(),
                command: format!("read version from {}", self.path.display()),
                stderr: "no string 'version' key".to_string(),
            }
            .into()),
        }
    }

    fn set_version(&mut self, version: &str) -> Result<ExecutedCommand> {
        let mut table = self.load()?;
        table.insert("version".to_string(), Value::String(version.to_string()));
        self.save(&table)?;
        Ok(ExecutedCommand::ok(self.edit_command("version")))
    }

    fn property(&self, name: &str) -> Result<Option<String>> {
        let table = self.load()?;
        Ok(table
            .get("properties")
            .and_then(Value::as_table)
            .and_then(|properties| properties.get(name))
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }))
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<ExecutedCommand> {
        let mut table = self.load()?;
        let properties = table
            .entry("properties")
            .or_insert_with(|| Value::Table(Table::new()));
        let Some(properties) = properties.as_table_mut() else {
            return Err(FlowError::ToolFailed {
                tool: "build".to_string(),
                command: self.edit_command("properties"),
                stderr: "'properties' is not a table".to_string(),
            }
            .into());
        };
        properties.insert(name.to_string(), Value::String(value.to_string()));
        self.save(&table)?;
        Ok(ExecutedCommand::ok(self.edit_command(&format!("property '{name}'"))))
    }

    fn install(&mut self) -> Result<ExecutedCommand> {
        match &self.install_command {
            Some(command) => run_shell(command, &self.root),
            None => Ok(ExecutedCommand::ok("install (no install command configured)")),
        }
    }
}
