//! Git facade
//!
//! All version control access goes through [`Git`], a thin synchronous
//! wrapper over the `git` executable bound to one repository and remote.
//! Operations are grouped by concern:
//!
//! - `branch`: branch CRUD and ancestry queries
//! - `remote`: fetch, push and local/remote comparison
//! - `rebase` / `merge`: history integration with conflicts as results
//! - `status`: in-progress operations and working tree state
//! - `commit`: commits, tags and resets
//! - `stash`: stashing local changes
//! - `local_config`: repository-local git config
//! - `plumbing`: object and ref writes that bypass the working tree
//!
//! Expected conditions (conflicts, missing refs) are returned as values;
//! anything else fails with [`crate::error::FlowError::ToolFailed`].

pub mod branch;
pub mod commit;
pub mod local_config;
pub mod merge;
pub mod plumbing;
pub mod rebase;
pub mod remote;
pub mod runner;
pub mod stash;
pub mod status;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Output;

pub use rebase::IntegrationResult;
pub use remote::{BranchSync, PushMode};
pub use status::OperationInProgress;

use runner::{run_git, run_git_bool, run_git_checked, run_git_checked_with_env, run_git_with_env};

/// Handle on one repository and its remote.
#[derive(Debug, Clone)]
pub struct Git {
    repo_root: PathBuf,
    remote: String,
}

impl Git {
    pub fn new(repo_root: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            repo_root: repo_root.into(),
            remote: remote.into(),
        }
    }

    /// Open the repository containing `dir`.
    pub fn discover(dir: &Path, remote: &str) -> Result<Self> {
        let root = run_git_checked(&["rev-parse", "--show-toplevel"], dir)
            .with_context(|| format!("{} is not inside a git repository", dir.display()))?;
        Ok(Self::new(root, remote))
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Remote-tracking ref name of a branch, e.g. `origin/master`.
    pub fn remote_ref(&self, branch: &str) -> String {
        format!("{}/{branch}", self.remote)
    }

    pub(crate) fn run(&self, args: &[&str]) -> Result<Output> {
        run_git(args, &self.repo_root)
    }

    pub(crate) fn run_env(&self, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
        run_git_with_env(args, env, &self.repo_root)
    }

    pub(crate) fn checked(&self, args: &[&str]) -> Result<String> {
        run_git_checked(args, &self.repo_root)
    }

    pub(crate) fn checked_env(&self, args: &[&str], env: &[(&str, &str)]) -> Result<String> {
        run_git_checked_with_env(args, env, &self.repo_root)
    }

    pub(crate) fn succeeds(&self, args: &[&str]) -> bool {
        run_git_bool(args, &self.repo_root)
    }
}
