//! Merge and revert operations
//!
//! Conflicts are left in place for the caller to record and resume; nothing
//! here aborts on its own.

use anyhow::Result;
use std::process::Output;
use tracing::debug;

use super::rebase::IntegrationResult;
use super::runner::tool_failed;
use super::status::OperationInProgress;
use super::Git;

const NO_EDITOR: [(&str, &str); 1] = [("GIT_EDITOR", "true")];

impl Git {
    /// Merge `branch` into the checked out branch.
    ///
    /// With `no_ff` a merge commit is always created.
    pub fn merge(&self, branch: &str, message: &str, no_ff: bool) -> Result<IntegrationResult> {
        debug!(branch, no_ff, "merge");
        let mut args = vec!["merge", "--no-edit", "-m", message];
        if no_ff {
            args.push("--no-ff");
        }
        args.push(branch);

        let output = self.run_env(&args, &NO_EDITOR)?;
        self.merge_outcome(&args, &output)
    }

    /// Fast-forward the checked out branch to `branch`; fails if impossible.
    pub fn merge_ff_only(&self, branch: &str) -> Result<()> {
        self.checked(&["merge", "--ff-only", "--quiet", branch])?;
        Ok(())
    }

    /// Conclude a merge whose conflicts were resolved and staged.
    pub fn merge_commit(&self) -> Result<()> {
        self.checked_env(&["commit", "--no-edit"], &NO_EDITOR)?;
        Ok(())
    }

    pub fn merge_abort(&self) -> Result<()> {
        self.checked(&["merge", "--abort"])?;
        Ok(())
    }

    /// Revert `commit` on the checked out branch with the given message.
    ///
    /// A revert that changes nothing creates no commit.
    pub fn revert(&self, commit: &str, message: &str) -> Result<IntegrationResult> {
        debug!(commit, "revert");
        let args = ["revert", "--no-commit", commit];
        let output = self.run(&args)?;
        if !output.status.success() {
            if self.operation_in_progress()? == OperationInProgress::Revert {
                return Ok(IntegrationResult::Conflict {
                    conflicting_files: self.unmerged_files()?,
                });
            }
            return Err(tool_failed(&args, &output).into());
        }

        if self.has_staged_changes()? {
            self.checked(&["commit", "-q", "-m", message])?;
        } else {
            // Clear the sequencer state left by --no-commit.
            self.run(&["revert", "--quit"])?;
        }
        Ok(IntegrationResult::Clean)
    }

    pub fn revert_abort(&self) -> Result<()> {
        self.checked(&["revert", "--abort"])?;
        Ok(())
    }

    fn merge_outcome(&self, args: &[&str], output: &Output) -> Result<IntegrationResult> {
        if output.status.success() {
            return Ok(IntegrationResult::Clean);
        }
        if matches!(self.operation_in_progress()?, OperationInProgress::Merge { .. }) {
            return Ok(IntegrationResult::Conflict {
                conflicting_files: self.unmerged_files()?,
            });
        }
        Err(tool_failed(args, output).into())
    }
}
