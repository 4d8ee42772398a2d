//! `.gitflow.toml` configuration
//!
//! Every section has defaults, so a repository without a config file works
//! with the conventional layout (`master`, `feature/`, `branch-config`, ...).

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::properties::UserProperties;
use crate::models::BranchType;

pub const CONFIG_FILE_NAME: &str = ".gitflow.toml";

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub remote: RemoteSettings,
    pub branches: BranchSettings,
    pub version: VersionSettings,
    pub workflow: WorkflowSettings,
    pub build: BuildSettings,
    pub messages: CommitMessages,
    pub additional_version_commands: Vec<AdditionalVersionCommand>,
}

impl FlowConfig {
    /// Load `.gitflow.toml` from the repository root, or defaults when absent.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = repo_root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `-D flow.*` switches given on the command line.
    pub fn apply_overrides(&mut self, properties: &UserProperties) {
        if let Some(push) = properties.flag("flow.push") {
            self.remote.push = push;
        }
        if let Some(fetch) = properties.flag("flow.fetch") {
            self.remote.fetch = fetch;
        }
        if let Some(install) = properties.flag("flow.installProject") {
            self.workflow.install_project = install;
        }
        if let Some(merge) = properties.flag("flow.updateWithMerge") {
            self.workflow.update_with_merge = merge;
        }
        if let Some(skip) = properties.flag("flow.skipFeatureVersion") {
            self.version.skip_feature_version = skip;
        }
        if let Some(skip) = properties.flag("flow.skipEpicVersion") {
            self.version.skip_epic_version = skip;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub name: String,
    pub fetch: bool,
    pub push: bool,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            name: "origin".to_string(),
            fetch: true,
            push: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchSettings {
    pub production: String,
    pub config_branch: String,
    pub feature_prefix: String,
    pub epic_prefix: String,
    pub release_prefix: String,
    pub hotfix_prefix: String,
    pub maintenance_prefix: String,
    pub support_prefix: String,
    pub integration_prefix: String,
    pub temp_prefix: String,
}

impl Default for BranchSettings {
    fn default() -> Self {
        Self {
            production: "master".to_string(),
            config_branch: "branch-config".to_string(),
            feature_prefix: "feature/".to_string(),
            epic_prefix: "epic/".to_string(),
            release_prefix: "release/".to_string(),
            hotfix_prefix: "hotfix/".to_string(),
            maintenance_prefix: "maintenance/".to_string(),
            support_prefix: "support/".to_string(),
            integration_prefix: "integration/".to_string(),
            temp_prefix: "tmp-".to_string(),
        }
    }
}

impl BranchSettings {
    pub fn prefix(&self, branch_type: BranchType) -> &str {
        match branch_type {
            BranchType::Feature => &self.feature_prefix,
            BranchType::Epic => &self.epic_prefix,
            BranchType::Release => &self.release_prefix,
            BranchType::Hotfix => &self.hotfix_prefix,
            BranchType::Maintenance => &self.maintenance_prefix,
            BranchType::Support => &self.support_prefix,
            BranchType::Integration => &self.integration_prefix,
        }
    }

    pub fn branch_name(&self, branch_type: BranchType, identifier: &str) -> String {
        format!("{}{identifier}", self.prefix(branch_type))
    }

    /// Branch marking the last integrated (known good) state of `base`.
    pub fn integration_branch(&self, base: &str) -> String {
        format!("{}{base}", self.integration_prefix)
    }

    /// Throwaway branch used while integrating `branch` into another one.
    pub fn temp_branch(&self, branch: &str) -> String {
        format!("{}{branch}", self.temp_prefix)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionSettings {
    pub snapshot_suffix: String,
    pub separator: String,
    pub issue_pattern: Option<String>,
    pub tag_prefix: String,
    pub skip_feature_version: bool,
    pub skip_epic_version: bool,
}

impl Default for VersionSettings {
    fn default() -> Self {
        Self {
            snapshot_suffix: "-SNAPSHOT".to_string(),
            separator: "-".to_string(),
            issue_pattern: Some("[A-Z][A-Z0-9]*-[0-9]+".to_string()),
            tag_prefix: "v".to_string(),
            skip_feature_version: false,
            skip_epic_version: false,
        }
    }
}

impl VersionSettings {
    pub fn issue_regex(&self) -> Result<Option<Regex>> {
        self.issue_pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("Invalid issue pattern '{pattern}'"))
            })
            .transpose()
    }

    pub fn skip_version(&self, branch_type: BranchType) -> bool {
        match branch_type {
            BranchType::Feature => self.skip_feature_version,
            BranchType::Epic => self.skip_epic_version,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Merge the base branch into feature branches instead of rebasing.
    pub update_with_merge: bool,
    /// Run the project install before merging into the base branch.
    pub install_project: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildBackend {
    #[default]
    File,
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub backend: BuildBackend,
    /// Project descriptor used by the `file` backend.
    pub project_file: String,
    pub version_command: Option<String>,
    pub set_version_command: Option<String>,
    pub property_command: Option<String>,
    pub set_property_command: Option<String>,
    pub install_command: Option<String>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            backend: BuildBackend::File,
            project_file: "project.toml".to_string(),
            version_command: None,
            set_version_command: None,
            property_command: None,
            set_property_command: None,
            install_command: None,
        }
    }
}

/// Commit message templates. `@{name}` placeholders are substituted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitMessages {
    pub feature_start: String,
    pub epic_start: String,
    pub release_start: String,
    pub hotfix_start: String,
    pub maintenance_start: String,
    pub finish_merge: String,
    pub update_merge: String,
    pub version_revert: String,
    pub development_version: String,
    pub set_version: String,
}

impl Default for CommitMessages {
    fn default() -> Self {
        Self {
            feature_start: "@{key}: updating versions for feature branch".to_string(),
            epic_start: "@{key}: updating versions for epic branch".to_string(),
            release_start: "NO-ISSUE: updating versions for release".to_string(),
            hotfix_start: "NO-ISSUE: updating versions for hotfix".to_string(),
            maintenance_start: "NO-ISSUE: updating versions for maintenance branch".to_string(),
            finish_merge: "@{key}: Merge branch @{branch}".to_string(),
            update_merge: "@{key}: Merge branch @{base} into @{branch}".to_string(),
            version_revert: "@{key}: reverting versions for development branch".to_string(),
            development_version: "NO-ISSUE: updating for next development version".to_string(),
            set_version: "NO-ISSUE: updating versions".to_string(),
        }
    }
}

impl CommitMessages {
    pub fn start(&self, branch_type: BranchType) -> &str {
        match branch_type {
            BranchType::Feature => &self.feature_start,
            BranchType::Epic => &self.epic_start,
            BranchType::Release => &self.release_start,
            BranchType::Hotfix => &self.hotfix_start,
            _ => &self.maintenance_start,
        }
    }

    /// Substitute `@{name}` placeholders; unknown placeholders stay as written.
    pub fn render(template: &str, vars: &BTreeMap<&str, String>) -> String {
        vars.iter().fold(template.to_string(), |message, (name, value)| {
            message.replace(&format!("@{{{name}}}"), value)
        })
    }
}

fn default_true() -> bool {
    true
}

/// Extra version property propagated alongside the project version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdditionalVersionCommand {
    /// Property name; also the `-D` name that supplies the value explicitly.
    pub property: String,
    /// Question asked in interactive mode. Without it the default is used.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Expression for the default value.
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}
