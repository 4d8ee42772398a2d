//! Central config entry of one branch

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::models::BranchType;

pub const BRANCH_TYPE: &str = "branchType";
pub const BASE_BRANCH: &str = "baseBranch";
pub const ISSUE_NUMBER: &str = "issueNumber";
pub const BASE_VERSION: &str = "baseVersion";
pub const START_COMMIT_MESSAGE: &str = "startCommitMessage";
pub const VERSION_CHANGE_COMMIT: &str = "versionChangeCommit";

/// Keys every lifecycle branch may carry, in addition to free keys.
pub const WELL_KNOWN_KEYS: [&str; 6] = [
    BRANCH_TYPE,
    BASE_BRANCH,
    ISSUE_NUMBER,
    BASE_VERSION,
    START_COMMIT_MESSAGE,
    VERSION_CHANGE_COMMIT,
];

/// Key/value metadata recorded for a branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchCentralConfig {
    values: BTreeMap<String, String>,
}

impl BranchCentralConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Set `key` when `value` is present, remove it otherwise.
    pub fn set_opt(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => self.set(key, value),
            None => {
                self.remove(key);
            }
        }
    }

    pub fn branch_type(&self) -> Option<BranchType> {
        self.get(BRANCH_TYPE).and_then(|t| BranchType::from_str(t).ok())
    }

    pub fn base_branch(&self) -> Option<&str> {
        self.get(BASE_BRANCH)
    }

    pub fn issue_number(&self) -> Option<&str> {
        self.get(ISSUE_NUMBER)
    }

    pub fn base_version(&self) -> Option<&str> {
        self.get(BASE_VERSION)
    }

    pub fn start_commit_message(&self) -> Option<&str> {
        self.get(START_COMMIT_MESSAGE)
    }

    /// Absent when version bumping was skipped at start.
    pub fn version_change_commit(&self) -> Option<&str> {
        self.get(VERSION_CHANGE_COMMIT)
    }
}
