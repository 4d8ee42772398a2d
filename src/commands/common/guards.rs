//! Preconditions checked before a goal touches the repository

use anyhow::Result;
use tracing::debug;

use super::FlowContext;
use crate::breakpoint::{Ambient, Breakpoint};
use crate::commands::resume::goal_commands;
use crate::error::{fail, FailureMessage};
use crate::git::{BranchSync, PushMode};
use crate::models::Goal;

impl FlowContext {
    /// Breakpoint pending on the branch being worked on, with its owner.
    pub fn pending_breakpoint(&self) -> Result<Option<(String, Breakpoint)>> {
        let ambient = Ambient::capture(&self.git)?;
        match ambient.working_branch() {
            Some(working) => self.breakpoints().locate(working),
            None => Ok(None),
        }
    }

    /// Refuse `goal` while an unrelated interrupted operation is pending.
    ///
    /// Returns the breakpoint when `goal` is the one that resumes or
    /// unwinds it.
    pub fn check_breakpoint(&self, goal: Goal) -> Result<Option<(String, Breakpoint)>> {
        admit(goal, self.pending_breakpoint()?)
    }

    /// Like [`check_breakpoint`](Self::check_breakpoint) for a branch named
    /// explicitly rather than the one checked out.
    pub fn check_branch_breakpoint(&self, goal: Goal, branch: &str) -> Result<Option<(String, Breakpoint)>> {
        admit(goal, self.breakpoint_of(branch)?)
    }

    /// Refuse to touch `branch` while any interrupted operation uses it.
    pub fn require_no_breakpoint(&self, branch: &str) -> Result<()> {
        match self.breakpoint_of(branch)? {
            Some((owner, breakpoint)) => refuse(&owner, &breakpoint),
            None => Ok(()),
        }
    }

    /// Breakpoint owned by `branch`, or one that works on it.
    fn breakpoint_of(&self, branch: &str) -> Result<Option<(String, Breakpoint)>> {
        match self.breakpoints().load(branch)? {
            Some(breakpoint) => Ok(Some((branch.to_string(), breakpoint))),
            None => self.breakpoints().locate(branch),
        }
    }

    pub fn require_no_operation(&self) -> Result<()> {
        let operation = self.git.operation_in_progress()?;
        if operation.is_none() {
            return Ok(());
        }
        fail(
            FailureMessage::new(format!(
                "The repository is in the middle of {}.",
                operation.describe()
            ))
            .solution("Complete or abort it before running gitflow goals."),
        )
    }

    pub fn require_clean_tree(&self) -> Result<()> {
        if !self.git.has_uncommitted_changes()? {
            return Ok(());
        }
        fail(
            FailureMessage::new("You have some uncommitted files.")
                .solution("Commit or discard local changes in order to proceed.")
                .step("git add -u")
                .step("git commit -m \"your message\"")
                .step("git stash"),
        )
    }

    pub fn fetch(&self) -> Result<()> {
        if self.config.remote.fetch && self.git.has_remote() {
            self.git.fetch()?;
        }
        Ok(())
    }

    pub fn push(&self, branch: &str, mode: PushMode) -> Result<()> {
        if self.config.remote.push && self.git.has_remote() {
            debug!(branch, "pushing");
            self.git.push(branch, mode)?;
        }
        Ok(())
    }

    pub fn push_enabled(&self) -> bool {
        self.config.remote.push && self.git.has_remote()
    }

    /// Make sure the local branch is not behind the remote one. A branch
    /// that only exists remotely is created locally; unpushed local commits
    /// are fine; anything else is reported, never resolved.
    pub fn ensure_synced(&self, branch: &str) -> Result<()> {
        let remote_ref = self.git.remote_ref(branch);
        match self.git.compare(branch)? {
            BranchSync::InSync | BranchSync::LocalOnly => Ok(()),
            BranchSync::RemoteOnly => self.git.create_tracking_branch(branch),
            BranchSync::Missing => fail(FailureMessage::new(format!(
                "Branch '{branch}' does not exist locally or remotely."
            ))),
            BranchSync::LocalAhead(count) => {
                debug!(branch, count, "local commits not pushed yet");
                Ok(())
            }
            BranchSync::RemoteAhead(count) => fail(
                FailureMessage::new(format!(
                    "Remote branch '{remote_ref}' is ahead of local '{branch}' by {count} commit(s)."
                ))
                .solution("Pull the remote changes first.")
                .step(format!("git checkout {branch}"))
                .step(format!("git pull {} {branch}", self.git.remote())),
            ),
            BranchSync::Diverged { local, remote } => fail(
                FailureMessage::new(format!(
                    "Local branch '{branch}' and '{remote_ref}' diverged ({local} local, {remote} remote commit(s))."
                ))
                .solution("Reconcile both branches manually, then push.")
                .step(format!("git checkout {branch}"))
                .step(format!("git pull --rebase {} {branch}", self.git.remote()))
                .step(format!("git push {} {branch}", self.git.remote())),
            ),
        }
    }

    /// Delete a branch locally and, when pushing is enabled, remotely.
    pub fn delete_everywhere(&self, branch: &str) -> Result<()> {
        if self.git.branch_exists(branch) {
            self.git.delete_branch(branch)?;
        }
        if self.push_enabled() && self.git.remote_branch_exists(branch) {
            self.git.delete_remote_branch(branch)?;
        }
        Ok(())
    }
}

/// `goal` may resume a breakpoint of its own step and unwind it through the
/// step's abort goal. A lifecycle abort unwinds any breakpoint of its branch
/// type.
fn admit(goal: Goal, pending: Option<(String, Breakpoint)>) -> Result<Option<(String, Breakpoint)>> {
    let Some((owner, breakpoint)) = pending else {
        return Ok(None);
    };
    let step = breakpoint.step();
    let admitted = step.goal() == Some(goal)
        || step.abort_goal() == Some(goal)
        || Goal::abort_for(step.branch_type) == Some(goal);
    if admitted {
        Ok(Some((owner, breakpoint)))
    } else {
        refuse(&owner, &breakpoint)
    }
}

fn refuse<T>(owner: &str, breakpoint: &Breakpoint) -> Result<T> {
    let step = breakpoint.step();
    fail(
        FailureMessage::new(format!(
            "An interrupted operation ({step}) is pending on branch '{owner}'."
        ))
        .solution("Finish this interrupted operation or abort it first.")
        .with_steps(goal_commands(&step)),
    )
}
