//! Shared state and helpers of every goal
//!
//! A [`FlowContext`] bundles the repository, the configuration, the `-D`
//! properties and the two collaborators (prompt and project build). Engines
//! receive it mutably and never reach for global state.

mod guards;
mod output;
mod versioning;

pub use versioning::VersionVariables;

use anyhow::{bail, Result};
use regex::Regex;
use std::path::Path;

pub use output::{done, note, warn};

use crate::breakpoint::BreakpointStore;
use crate::central::{BranchCentralConfig, CentralConfigStore};
use crate::config::{FlowConfig, UserProperties};
use crate::error::{fail, FailureMessage};
use crate::git::Git;
use crate::models::{BranchDescriptor, BranchType};
use crate::project::{self, CommandLog, ProjectBuild};
use crate::prompt::{BatchPrompter, ConsolePrompter, Prompter};
use crate::version::VersionTransitions;

pub struct FlowContext {
    pub git: Git,
    pub config: FlowConfig,
    pub properties: UserProperties,
    pub batch_mode: bool,
    prompter: Box<dyn Prompter>,
    project: Box<dyn ProjectBuild>,
    log: CommandLog,
    issue_regex: Option<Regex>,
}

impl FlowContext {
    /// Context with explicit collaborators. `-D flow.*` switches in
    /// `properties` are applied to `config`.
    pub fn new(
        git: Git,
        mut config: FlowConfig,
        properties: UserProperties,
        batch_mode: bool,
        prompter: Box<dyn Prompter>,
        project: Box<dyn ProjectBuild>,
    ) -> Result<Self> {
        config.apply_overrides(&properties);
        let issue_regex = config.version.issue_regex()?;
        Ok(Self {
            git,
            config,
            properties,
            batch_mode,
            prompter,
            project,
            log: CommandLog::default(),
            issue_regex,
        })
    }

    /// Context for the repository containing `dir`, reading `.gitflow.toml`
    /// and talking to the terminal unless `batch_mode` is set.
    pub fn open(dir: &Path, properties: UserProperties, batch_mode: bool) -> Result<Self> {
        let probe = Git::discover(dir, "origin")?;
        let config = FlowConfig::load(probe.repo_root())?;
        let git = Git::new(probe.repo_root(), config.remote.name.as_str());
        let project = project::open(&config.build, git.repo_root());
        let prompter: Box<dyn Prompter> = if batch_mode {
            Box::new(BatchPrompter)
        } else {
            Box::new(ConsolePrompter::stdio())
        };
        Self::new(git, config, properties, batch_mode, prompter, project)
    }

    pub fn central(&self) -> CentralConfigStore<'_> {
        CentralConfigStore::new(
            &self.git,
            self.config.branches.config_branch.as_str(),
            self.config.remote.fetch,
            self.config.remote.push,
        )
    }

    pub fn breakpoints(&self) -> BreakpointStore<'_> {
        BreakpointStore::new(&self.git)
    }

    pub fn versions(&self) -> VersionTransitions {
        VersionTransitions::new(&self.config.version)
    }

    pub fn describe(&self, branch: &str) -> Option<BranchDescriptor> {
        BranchDescriptor::parse(branch, &self.config.branches, self.issue_regex.as_ref())
    }

    pub fn project(&self) -> &dyn ProjectBuild {
        self.project.as_ref()
    }

    pub fn command_log(&self) -> &CommandLog {
        &self.log
    }

    pub fn production(&self) -> &str {
        &self.config.branches.production
    }

    /// Base branch recorded in `entry`, or the production branch.
    pub fn base_of(&self, entry: &BranchCentralConfig) -> String {
        entry
            .base_branch()
            .map(String::from)
            .unwrap_or_else(|| self.production().to_string())
    }

    /// Value of a parameter: the `-D` property, or the user's answer.
    pub fn param(&mut self, name: &str, question: &str) -> Result<String> {
        if let Some(value) = self.properties.get(name) {
            return Ok(value.to_string());
        }
        self.prompter.prompt(name, question)
    }

    pub fn param_default(&mut self, name: &str, question: &str, default: &str) -> Result<String> {
        if let Some(value) = self.properties.get(name) {
            return Ok(value.to_string());
        }
        self.prompter.prompt_default(name, question, default)
    }

    /// One of `choices`; a `-D` value outside them is rejected.
    pub fn choose(
        &mut self,
        name: &str,
        question: &str,
        choices: &[&str],
        default: Option<&str>,
    ) -> Result<String> {
        if let Some(value) = self.properties.get(name) {
            if !choices.contains(&value) {
                bail!(
                    "Invalid value '{value}' for '{name}', expected one of: {}",
                    choices.join(", ")
                );
            }
            return Ok(value.to_string());
        }
        match default {
            Some(default) => self.prompter.choose_default(name, question, choices, default),
            None => self.prompter.choose(name, question, choices),
        }
    }

    /// Yes/no question. `-Dforce=true` answers yes to all of them.
    pub fn confirm(&mut self, name: &str, question: &str, default: bool) -> Result<bool> {
        if self.properties.is_forced() {
            return Ok(true);
        }
        if let Some(answer) = self.properties.flag(name) {
            return Ok(answer);
        }
        let default = if default { "y" } else { "n" };
        let answer = self
            .prompter
            .choose_default(name, question, &["y", "n"], default)?;
        Ok(answer.eq_ignore_ascii_case("y"))
    }

    /// Branch of `branch_type` to operate on: the checked out one when it
    /// has that type, otherwise chosen among the local branches.
    pub fn select_branch(&mut self, branch_type: BranchType, parameter: &str) -> Result<String> {
        self.select_branch_from(branch_type, parameter, false)
    }

    /// Like [`Self::select_branch`], optionally offering branches that only
    /// exist on the remote.
    pub fn select_branch_from(
        &mut self,
        branch_type: BranchType,
        parameter: &str,
        include_remote: bool,
    ) -> Result<String> {
        if let Some(current) = self.git.current_branch()? {
            if self.describe(&current).map(|d| d.branch_type) == Some(branch_type) {
                return Ok(current);
            }
        }

        let prefix = self.config.branches.prefix(branch_type).to_string();
        let mut candidates = self.git.list_branches(&prefix)?;
        if include_remote {
            for name in self.git.list_remote_branches(&prefix)? {
                if !candidates.contains(&name) {
                    candidates.push(name);
                }
            }
            candidates.sort();
        }
        if candidates.is_empty() {
            return fail(
                FailureMessage::new(format!("There are no {branch_type} branches."))
                    .solution(format!("Start a {branch_type} branch first.")),
            );
        }
        let choices: Vec<&str> = candidates.iter().map(String::as_str).collect();
        self.choose(
            parameter,
            &format!("Which {branch_type} branch?"),
            &choices,
            None,
        )
    }
}
