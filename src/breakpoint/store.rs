//! Breakpoints persisted in local git config under `branch.<owner>.*`
//!
//! Local config is never pushed, so a breakpoint only exists in the clone
//! where the operation was interrupted.

use anyhow::Result;
use tracing::debug;

use super::kind::{Breakpoint, BREAKPOINT, EXTRA_KEYS};
use crate::git::Git;
use crate::models::BranchType;

pub struct BreakpointStore<'a> {
    git: &'a Git,
}

impl<'a> BreakpointStore<'a> {
    pub fn new(git: &'a Git) -> Self {
        Self { git }
    }

    fn key(owner: &str, name: &str) -> String {
        format!("branch.{owner}.{name}")
    }

    pub fn load(&self, owner: &str) -> Result<Option<Breakpoint>> {
        if self.git.config_get(&Self::key(owner, BREAKPOINT))?.is_none() {
            return Ok(None);
        }
        // Read every value up front; the parser only sees the snapshot.
        let mut values = Vec::new();
        for name in Self::all_keys() {
            if let Some(value) = self.git.config_get(&Self::key(owner, &name))? {
                values.push((name, value));
            }
        }
        let breakpoint = Breakpoint::from_entries(owner, |key| {
            values
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone())
        })?;
        Ok(Some(breakpoint))
    }

    /// Record `breakpoint` for `owner`, replacing any previous one.
    pub fn save(&self, owner: &str, breakpoint: &Breakpoint) -> Result<()> {
        self.clear(owner)?;
        debug!(owner, step = %breakpoint.step(), "saving breakpoint");
        // The id is written last so a half-written breakpoint is never seen.
        let entries = breakpoint.to_entries();
        for (name, value) in entries.iter().filter(|(name, _)| name != BREAKPOINT) {
            self.git.config_set(&Self::key(owner, name), value)?;
        }
        for (name, value) in entries.iter().filter(|(name, _)| name == BREAKPOINT) {
            self.git.config_set(&Self::key(owner, name), value)?;
        }
        Ok(())
    }

    pub fn clear(&self, owner: &str) -> Result<()> {
        // The id goes first so an interrupted clear leaves no breakpoint.
        self.git.config_unset(&Self::key(owner, BREAKPOINT))?;
        for name in Self::all_keys() {
            self.git.config_unset(&Self::key(owner, &name))?;
        }
        Ok(())
    }

    /// Every pending breakpoint as `(owner, breakpoint)`.
    pub fn list(&self) -> Result<Vec<(String, Breakpoint)>> {
        let mut found = Vec::new();
        for (key, _) in self.git.config_get_regexp(r"^branch\..*\.breakpoint$")? {
            let Some(owner) = key
                .strip_prefix("branch.")
                .and_then(|rest| rest.strip_suffix(".breakpoint"))
            else {
                continue;
            };
            if let Some(breakpoint) = self.load(owner)? {
                found.push((owner.to_string(), breakpoint));
            }
        }
        Ok(found)
    }

    /// Breakpoint whose working branch is `branch`.
    pub fn locate(&self, branch: &str) -> Result<Option<(String, Breakpoint)>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|(owner, breakpoint)| breakpoint.working_branch(owner) == branch))
    }

    fn all_keys() -> Vec<String> {
        BranchType::ALL
            .iter()
            .map(|t| format!("old{}HEAD", t.capitalized()))
            .chain(EXTRA_KEYS.iter().map(|k| k.to_string()))
            .collect()
    }
}
