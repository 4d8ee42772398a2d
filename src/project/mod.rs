//! Project build collaborator
//!
//! The engines only ask "get/set version", "get/set property" and "run the
//! install". Every mutating call returns the [`ExecutedCommand`] it ran so
//! the context can keep a [`CommandLog`].

mod command;
mod file;
mod shell;

use anyhow::Result;
use std::path::Path;

pub use command::CommandBuild;
pub use file::ProjectFile;
pub use shell::run_shell;

use crate::config::{BuildBackend, BuildSettings};

/// Record of one build tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCommand {
    pub command: String,
    pub success: bool,
    pub output: String,
}

impl ExecutedCommand {
    pub fn ok(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success: true,
            output: String::new(),
        }
    }
}

pub trait ProjectBuild {
    fn version(&self) -> Result<String>;

    fn set_version(&mut self, version: &str) -> Result<ExecutedCommand>;

    /// Project property, `None` when the project does not define it.
    fn property(&self, name: &str) -> Result<Option<String>>;

    fn set_property(&mut self, name: &str, value: &str) -> Result<ExecutedCommand>;

    /// Run the project install. A failing build is reported through
    /// `success`, not as an error.
    fn install(&mut self) -> Result<ExecutedCommand>;
}

/// Commands executed during one goal.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    entries: Vec<ExecutedCommand>,
}

impl CommandLog {
    pub fn record(&mut self, command: ExecutedCommand) {
        self.entries.push(command);
    }

    pub fn entries(&self) -> &[ExecutedCommand] {
        &self.entries
    }
}

/// Build collaborator selected by the configuration.
pub fn open(settings: &BuildSettings, repo_root: &Path) -> Box<dyn ProjectBuild> {
    match settings.backend {
        BuildBackend::File => Box::new(ProjectFile::new(repo_root, settings)),
        BuildBackend::Command => Box::new(CommandBuild::new(repo_root, settings)),
    }
}
