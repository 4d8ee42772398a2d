//! Rebase operations

use anyhow::Result;
use std::process::Output;
use tracing::debug;

use super::runner::tool_failed;
use super::status::OperationInProgress;
use super::Git;

/// Outcome of an operation that may stop on conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationResult {
    Clean,
    Conflict { conflicting_files: Vec<String> },
}

impl IntegrationResult {
    pub fn is_clean(&self) -> bool {
        matches!(self, IntegrationResult::Clean)
    }
}

/// Non-interactive editor so `--continue` never opens one.
const NO_EDITOR: [(&str, &str); 1] = [("GIT_EDITOR", "true")];

impl Git {
    /// Rebase `branch` onto `onto`, replaying the commits after `upstream`.
    pub fn rebase_onto(&self, onto: &str, upstream: &str, branch: &str) -> Result<IntegrationResult> {
        debug!(onto, upstream, branch, "rebase --onto");
        let args = ["rebase", "--onto", onto, upstream, branch];
        let output = self.run_env(&args, &NO_EDITOR)?;
        self.rebase_outcome(&args, &output)
    }

    /// Rebase `branch` onto `upstream`.
    pub fn rebase(&self, upstream: &str, branch: &str) -> Result<IntegrationResult> {
        debug!(upstream, branch, "rebase");
        let args = ["rebase", upstream, branch];
        let output = self.run_env(&args, &NO_EDITOR)?;
        self.rebase_outcome(&args, &output)
    }

    /// Continue a paused rebase after the conflicts were resolved and staged.
    pub fn rebase_continue(&self) -> Result<IntegrationResult> {
        let args = ["rebase", "--continue"];
        let output = self.run_env(&args, &NO_EDITOR)?;
        self.rebase_outcome(&args, &output)
    }

    pub fn rebase_abort(&self) -> Result<()> {
        self.checked(&["rebase", "--abort"])?;
        Ok(())
    }

    fn rebase_outcome(&self, args: &[&str], output: &Output) -> Result<IntegrationResult> {
        if output.status.success() {
            return Ok(IntegrationResult::Clean);
        }
        if matches!(self.operation_in_progress()?, OperationInProgress::Rebase { .. }) {
            return Ok(IntegrationResult::Conflict {
                conflicting_files: self.unmerged_files()?,
            });
        }
        Err(tool_failed(args, output).into())
    }
}
