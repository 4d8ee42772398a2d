//! Core branch operations: create, switch, delete, list, check existence

use anyhow::Result;

use crate::git::runner::stdout_lines;
use crate::git::Git;

impl Git {
    /// Name of the checked out branch, `None` on a detached HEAD.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let output = self.run(&["symbolic-ref", "--short", "-q", "HEAD"])?;
        if !output.status.success() {
            return Ok(None);
        }
        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(name))
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        let ref_path = format!("refs/heads/{name}");
        self.succeeds(&["rev-parse", "--verify", "-q", &ref_path])
    }

    /// Whether the remote-tracking branch exists (as of the last fetch).
    pub fn remote_branch_exists(&self, name: &str) -> bool {
        let ref_path = format!("refs/remotes/{}/{name}", self.remote());
        self.succeeds(&["rev-parse", "--verify", "-q", &ref_path])
    }

    /// Create a new branch from a start point without switching to it.
    pub fn create_branch(&self, name: &str, start_point: &str) -> Result<()> {
        self.checked(&["branch", "--no-track", name, start_point])?;
        Ok(())
    }

    /// Create a local branch from its remote-tracking counterpart.
    pub fn create_tracking_branch(&self, name: &str) -> Result<()> {
        let upstream = self.remote_ref(name);
        self.checked(&["branch", "--track", name, &upstream])?;
        Ok(())
    }

    pub fn checkout(&self, name: &str) -> Result<()> {
        self.checked(&["checkout", "-q", name])?;
        Ok(())
    }

    /// Move a branch that is not checked out to another commit.
    pub fn force_branch(&self, name: &str, target: &str) -> Result<()> {
        self.checked(&["branch", "-f", name, target])?;
        Ok(())
    }

    /// Delete a local branch regardless of its merge state.
    pub fn delete_branch(&self, name: &str) -> Result<()> {
        self.checked(&["branch", "-D", name])?;
        Ok(())
    }

    /// Delete the branch on the remote and its remote-tracking ref.
    pub fn delete_remote_branch(&self, name: &str) -> Result<()> {
        self.checked(&["push", self.remote(), "--delete", name])?;
        Ok(())
    }

    /// Local branches whose name starts with `prefix`.
    pub fn list_branches(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("refs/heads/{prefix}");
        let stdout = self.checked(&["for-each-ref", "--format=%(refname:short)", &pattern])?;
        Ok(stdout_lines(&stdout)
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect())
    }

    /// Remote branches (without the remote name) whose name starts with `prefix`.
    pub fn list_remote_branches(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("refs/remotes/{}/", self.remote());
        let stdout = self.checked(&["for-each-ref", "--format=%(refname)", &pattern])?;
        Ok(stdout_lines(&stdout)
            .into_iter()
            .filter_map(|full| full.strip_prefix(&pattern).map(String::from))
            .filter(|name| name != "HEAD" && name.starts_with(prefix))
            .collect())
    }
}
