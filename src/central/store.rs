//! Central branch config store
//!
//! Entries live on an orphan branch (`branch-config` by default) that is
//! never checked out. Each lifecycle branch has one file named after the
//! URL-encoded branch name. Every update is a single commit built through a
//! private index, so the working tree and the user's index stay untouched.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;
use tracing::{debug, info};

use super::entry::BranchCentralConfig;
use super::properties::{decode, encode};
use crate::error::{fail, FailureMessage};
use crate::git::{BranchSync, Git, PushMode};

pub const CONFIG_COMMIT_MESSAGE: &str = "NO-ISSUE: updating branch configs";

pub struct CentralConfigStore<'a> {
    git: &'a Git,
    config_branch: String,
    fetch: bool,
    push: bool,
}

impl<'a> CentralConfigStore<'a> {
    pub fn new(git: &'a Git, config_branch: impl Into<String>, fetch: bool, push: bool) -> Self {
        Self {
            git,
            config_branch: config_branch.into(),
            fetch,
            push,
        }
    }

    pub fn config_branch(&self) -> &str {
        &self.config_branch
    }

    /// Entry of `branch`; empty when the branch has none.
    pub fn get(&self, branch: &str) -> Result<BranchCentralConfig> {
        let Some(tip) = self.sync_local()? else {
            return Ok(BranchCentralConfig::new());
        };
        let content = self.git.show_file(&tip, &file_name(branch))?;
        Ok(content
            .map(|c| BranchCentralConfig::from_map(decode(&c)))
            .unwrap_or_default())
    }

    /// Replace the entry of `branch`. An empty entry removes it.
    pub fn set(&self, branch: &str, config: &BranchCentralConfig) -> Result<()> {
        if config.is_empty() {
            return self.remove(branch);
        }
        self.write(branch, Some(encode(config.as_map())))
    }

    /// Update single values of an entry, keeping the rest.
    pub fn set_values(&self, branch: &str, values: &BTreeMap<&str, Option<String>>) -> Result<()> {
        let mut config = self.get(branch)?;
        for (key, value) in values {
            config.set_opt(key, value.as_deref());
        }
        self.set(branch, &config)
    }

    pub fn remove(&self, branch: &str) -> Result<()> {
        self.write(branch, None)
    }

    /// Branch names that have an entry.
    pub fn list(&self) -> Result<Vec<String>> {
        let Some(tip) = self.sync_local()? else {
            return Ok(Vec::new());
        };
        let mut names: Vec<String> = self
            .git
            .list_files(&tip)?
            .iter()
            .filter_map(|file| urlencoding::decode(file).ok().map(|name| name.into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Bring the local config branch up to date with the remote and return
    /// its tip, or `None` if no config exists anywhere yet.
    fn sync_local(&self) -> Result<Option<String>> {
        if self.git.current_branch()?.as_deref() == Some(self.config_branch.as_str()) {
            return fail(
                FailureMessage::new(format!(
                    "The central branch config branch '{}' is checked out.",
                    self.config_branch
                ))
                .solution("Switch to a working branch before running gitflow goals.")
                .step("git checkout master"),
            );
        }

        let branch = self.config_branch.as_str();
        if !self.git.branch_exists(branch) && self.fetch && self.git.has_remote() {
            self.git.fetch()?;
        }

        let local_ref = format!("refs/heads/{branch}");
        match self.git.compare(branch)? {
            BranchSync::Missing => Ok(None),
            BranchSync::InSync | BranchSync::LocalOnly | BranchSync::LocalAhead(_) => {
                self.git.rev_parse(&local_ref).map(Some)
            }
            BranchSync::RemoteOnly => {
                let remote_tip = self.git.rev_parse(&self.git.remote_ref(branch))?;
                debug!(branch, "creating local central config branch");
                self.git.update_ref(&local_ref, &remote_tip, None)?;
                Ok(Some(remote_tip))
            }
            BranchSync::RemoteAhead(_) => {
                let local_tip = self.git.rev_parse(&local_ref)?;
                let remote_tip = self.git.rev_parse(&self.git.remote_ref(branch))?;
                debug!(branch, "fast-forwarding central config branch");
                self.git.update_ref(&local_ref, &remote_tip, Some(&local_tip))?;
                Ok(Some(remote_tip))
            }
            BranchSync::Diverged { .. } => {
                let remote_ref = self.git.remote_ref(branch);
                fail(
                    FailureMessage::new(format!(
                        "The central branch config diverged: local '{branch}' and '{remote_ref}' both have new commits."
                    ))
                    .solution("Reconcile the local config branch with the remote one manually.")
                    .step(format!("git checkout {branch}"))
                    .step(format!("git rebase {remote_ref}"))
                    .step(format!("git push {} {branch}", self.git.remote()))
                    .step("git checkout -"),
                )
            }
        }
    }

    fn write(&self, branch: &str, content: Option<String>) -> Result<()> {
        let parent = self.sync_local()?;
        let file = file_name(branch);

        let scratch = TempDir::new().context("Failed to create private index directory")?;
        let index = scratch.path().join("index");
        if let Some(parent) = &parent {
            self.git.read_tree(&index, parent)?;
        }

        match content {
            Some(content) => {
                let blob_file = scratch.path().join("entry");
                fs::write(&blob_file, content)
                    .with_context(|| format!("Failed to write {}", blob_file.display()))?;
                let blob = self.git.hash_object(&blob_file)?;
                self.git.index_add(&index, &blob, &file)?;
            }
            None => {
                if parent.is_none() {
                    return Ok(());
                }
                self.git.index_remove(&index, &file)?;
            }
        }

        let tree = self.git.write_tree(&index)?;
        if let Some(parent) = &parent {
            if self.git.tree_of(parent)? == tree {
                debug!(branch, "central config unchanged");
                return self.publish();
            }
        }

        let commit = self
            .git
            .commit_tree(&tree, parent.as_deref(), CONFIG_COMMIT_MESSAGE)?;
        let local_ref = format!("refs/heads/{}", self.config_branch);
        self.git.update_ref(&local_ref, &commit, parent.as_deref())?;
        info!(branch, "central branch config updated");
        self.publish()
    }

    /// Push local config commits the remote does not have yet, including
    /// ones left behind by an earlier failed push.
    fn publish(&self) -> Result<()> {
        if !self.push || !self.git.has_remote() {
            return Ok(());
        }
        match self.git.compare(&self.config_branch)? {
            BranchSync::LocalAhead(_) | BranchSync::LocalOnly => {
                self.git.push(&self.config_branch, PushMode::Normal)
            }
            _ => Ok(()),
        }
    }
}

fn file_name(branch: &str) -> String {
    urlencoding::encode(branch).into_owned()
}
