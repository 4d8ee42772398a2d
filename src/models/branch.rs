//! Branch types and naming conventions

use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::config::BranchSettings;

/// Kind of a gitflow branch, derived from its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchType {
    Feature,
    Epic,
    Release,
    Hotfix,
    Maintenance,
    Support,
    Integration,
}

impl BranchType {
    pub const ALL: [BranchType; 7] = [
        BranchType::Feature,
        BranchType::Epic,
        BranchType::Release,
        BranchType::Hotfix,
        BranchType::Maintenance,
        BranchType::Support,
        BranchType::Integration,
    ];

    /// Lower-case name used in config values and step ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchType::Feature => "feature",
            BranchType::Epic => "epic",
            BranchType::Release => "release",
            BranchType::Hotfix => "hotfix",
            BranchType::Maintenance => "maintenance",
            BranchType::Support => "support",
            BranchType::Integration => "integration",
        }
    }

    /// Capitalized name used inside breakpoint keys (`oldFeatureHEAD`).
    pub fn capitalized(&self) -> &'static str {
        match self {
            BranchType::Feature => "Feature",
            BranchType::Epic => "Epic",
            BranchType::Release => "Release",
            BranchType::Hotfix => "Hotfix",
            BranchType::Maintenance => "Maintenance",
            BranchType::Support => "Support",
            BranchType::Integration => "Integration",
        }
    }

    /// Development branches carry an issue key and a version change commit
    /// that is reverted before they are merged back.
    pub fn is_development(&self) -> bool {
        matches!(self, BranchType::Feature | BranchType::Epic)
    }
}

impl fmt::Display for BranchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BranchType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown branch type '{s}'"))
    }
}

/// A branch name split into its gitflow parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDescriptor {
    pub name: String,
    pub branch_type: BranchType,
    pub prefix: String,
    pub identifier: String,
    pub issue_key: Option<String>,
}

impl BranchDescriptor {
    /// Parse a branch name using the configured prefixes.
    ///
    /// Returns `None` for branches outside the gitflow naming convention
    /// (e.g. the production branch).
    pub fn parse(name: &str, prefixes: &BranchSettings, issue_pattern: Option<&Regex>) -> Option<Self> {
        let (branch_type, prefix) = BranchType::ALL
            .into_iter()
            .map(|t| (t, prefixes.prefix(t)))
            .filter(|(_, prefix)| !prefix.is_empty() && name.starts_with(prefix))
            .max_by_key(|(_, prefix)| prefix.len())?;

        let identifier = name[prefix.len()..].to_string();
        if identifier.is_empty() {
            return None;
        }

        let issue_key = if branch_type.is_development() {
            Some(issue_key_of(&identifier, issue_pattern))
        } else {
            None
        };

        Some(Self {
            name: name.to_string(),
            branch_type,
            prefix: prefix.to_string(),
            identifier,
            issue_key,
        })
    }
}

/// Issue key of a development branch identifier.
///
/// The leading match of the issue pattern wins; without a match the whole
/// identifier is used.
pub fn issue_key_of(identifier: &str, issue_pattern: Option<&Regex>) -> String {
    issue_pattern
        .and_then(|re| re.find(identifier))
        .filter(|m| m.start() == 0)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| identifier.to_string())
}
