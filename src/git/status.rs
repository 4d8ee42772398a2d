//! Working tree status and in-progress operation detection

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use super::runner::stdout_lines;
use super::Git;

/// Multi-step git operation currently paused on HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationInProgress {
    None,
    /// Rebase of the named branch (`None` when rebasing a detached HEAD).
    Rebase { branch: Option<String> },
    /// Merge of `source`, when it can be named from MERGE_HEAD.
    Merge { source: Option<String> },
    Revert,
    CherryPick,
}

impl OperationInProgress {
    pub fn is_none(&self) -> bool {
        matches!(self, OperationInProgress::None)
    }

    pub fn describe(&self) -> String {
        match self {
            OperationInProgress::None => "no operation".to_string(),
            OperationInProgress::Rebase { branch: Some(b) } => format!("a rebase of '{b}'"),
            OperationInProgress::Rebase { branch: None } => "a rebase".to_string(),
            OperationInProgress::Merge { source: Some(s) } => format!("a merge of '{s}'"),
            OperationInProgress::Merge { source: None } => "a merge".to_string(),
            OperationInProgress::Revert => "a revert".to_string(),
            OperationInProgress::CherryPick => "a cherry-pick".to_string(),
        }
    }
}

impl Git {
    /// Absolute path of a file inside the git directory.
    fn git_path(&self, name: &str) -> Result<PathBuf> {
        let path = PathBuf::from(self.checked(&["rev-parse", "--git-path", name])?);
        Ok(if path.is_absolute() {
            path
        } else {
            self.repo_root().join(path)
        })
    }

    pub fn operation_in_progress(&self) -> Result<OperationInProgress> {
        for dir in ["rebase-merge", "rebase-apply"] {
            let path = self.git_path(dir)?;
            if path.is_dir() {
                let branch = fs::read_to_string(path.join("head-name"))
                    .ok()
                    .map(|name| name.trim().to_string())
                    .and_then(|name| name.strip_prefix("refs/heads/").map(String::from));
                return Ok(OperationInProgress::Rebase { branch });
            }
        }

        if let Ok(merge_head) = fs::read_to_string(self.git_path("MERGE_HEAD")?) {
            let sha = merge_head.lines().next().unwrap_or_default().trim().to_string();
            return Ok(OperationInProgress::Merge {
                source: self.branch_pointing_at(&sha)?,
            });
        }

        if self.git_path("REVERT_HEAD")?.exists() {
            return Ok(OperationInProgress::Revert);
        }
        if self.git_path("CHERRY_PICK_HEAD")?.exists() {
            return Ok(OperationInProgress::CherryPick);
        }
        Ok(OperationInProgress::None)
    }

    fn branch_pointing_at(&self, sha: &str) -> Result<Option<String>> {
        if sha.is_empty() {
            return Ok(None);
        }
        let stdout = self.checked(&[
            "for-each-ref",
            "--format=%(refname:short)",
            "--points-at",
            sha,
            "refs/heads",
        ])?;
        Ok(stdout_lines(&stdout).into_iter().next())
    }

    /// Files with unresolved conflicts.
    pub fn unmerged_files(&self) -> Result<Vec<String>> {
        let stdout = self.checked(&["diff", "--name-only", "--diff-filter=U"])?;
        Ok(stdout_lines(&stdout))
    }

    /// Staged or unstaged changes to tracked files.
    pub fn has_uncommitted_changes(&self) -> Result<bool> {
        let stdout = self.checked(&["status", "--porcelain", "--untracked-files=no"])?;
        Ok(!stdout.is_empty())
    }

    pub fn has_staged_changes(&self) -> Result<bool> {
        let output = self.run(&["diff", "--cached", "--quiet"])?;
        Ok(!output.status.success())
    }
}
