//! Version strings derived at branch transitions

use anyhow::{bail, Result};

use crate::config::VersionSettings;
use crate::error::{fail, FailureMessage};
use crate::models::BranchType;

/// Version arithmetic bound to the configured suffix and separator.
#[derive(Debug, Clone)]
pub struct VersionTransitions {
    suffix: String,
    separator: String,
}

impl VersionTransitions {
    pub fn new(settings: &VersionSettings) -> Self {
        Self {
            suffix: settings.snapshot_suffix.clone(),
            separator: settings.separator.clone(),
        }
    }

    /// Split off the snapshot suffix: `("1.0.0", true)` for `1.0.0-SNAPSHOT`.
    pub fn strip_suffix<'v>(&self, version: &'v str) -> (&'v str, bool) {
        match version.strip_suffix(self.suffix.as_str()) {
            Some(core) if !self.suffix.is_empty() => (core, true),
            _ => (version, false),
        }
    }

    fn with_suffix(&self, core: String, snapshot: bool) -> String {
        if snapshot {
            core + &self.suffix
        } else {
            core
        }
    }

    /// Version of a freshly started branch.
    ///
    /// `1.0.0-SNAPSHOT` + `GBLD-42` on a feature gives `1.0.0-GBLD-42-SNAPSHOT`;
    /// other types get a leading qualifier: `release-1.2.0-ISSUE-42-SNAPSHOT`.
    pub fn start_version(&self, branch_type: BranchType, base_version: &str, issue: &str) -> String {
        let (core, snapshot) = self.strip_suffix(base_version);
        let sep = &self.separator;
        let qualified = if branch_type.is_development() {
            format!("{core}{sep}{issue}")
        } else {
            format!("{branch_type}{sep}{core}{sep}{issue}")
        };
        self.with_suffix(qualified, snapshot)
    }

    /// Recover the issue key from a start version and the base it was
    /// derived from. Inverse of [`Self::start_version`].
    pub fn issue_from_version(
        &self,
        branch_type: BranchType,
        version: &str,
        base_version: &str,
    ) -> Option<String> {
        let (core, _) = self.strip_suffix(version);
        let (base_core, _) = self.strip_suffix(base_version);
        let sep = &self.separator;

        let rest = if branch_type.is_development() {
            core
        } else {
            core.strip_prefix(&format!("{branch_type}{sep}"))?
        };
        let issue = rest.strip_prefix(base_core)?.strip_prefix(sep.as_str())?;
        (!issue.is_empty()).then(|| issue.to_string())
    }

    /// Version with the snapshot suffix replaced by a build token.
    pub fn build_version(&self, version: &str, token: &str) -> Result<String> {
        let token = token.trim();
        if token.is_empty() {
            bail!("Build version token must not be empty");
        }
        let (core, _) = self.strip_suffix(version);
        Ok(format!("{core}{}{token}", self.separator))
    }

    /// Release version of a snapshot: the suffix is dropped.
    pub fn release_version(&self, version: &str) -> String {
        self.strip_suffix(version).0.to_string()
    }

    /// Next snapshot after a release: the last numeric component of the
    /// leading version number is incremented (`1.0.0` gives `1.0.1-SNAPSHOT`).
    pub fn next_development_version(&self, release: &str) -> Result<String> {
        let (core, _) = self.strip_suffix(release);
        let numeric_len = core
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(core.len());
        let numbers = core[..numeric_len].trim_end_matches('.');
        let rest = &core[numbers.len()..];

        let (head, last) = match numbers.rsplit_once('.') {
            Some((head, last)) => (Some(head), last),
            None => (None, numbers),
        };
        let Ok(last) = last.parse::<u64>() else {
            bail!("Version '{release}' does not start with a numeric component");
        };
        let Some(next) = last.checked_add(1) else {
            return fail(
                FailureMessage::new(format!(
                    "The last component of version '{release}' cannot be incremented."
                ))
                .solution("Pass the next development version explicitly.")
                .step("-DdevelopmentVersion=<version>"),
            );
        };
        let bumped = match head {
            Some(head) => format!("{head}.{next}{rest}"),
            None => format!("{next}{rest}"),
        };
        Ok(self.with_suffix(bumped, true))
    }
}
