//! `*-reset-to-remote`: make a local branch match its remote counterpart

use anyhow::{bail, Result};
use tracing::info;

use super::common::{done, note, FlowContext};
use crate::error::{fail, FailureMessage};
use crate::git::BranchSync;
use crate::models::{BranchType, Goal};

fn goal_for(branch_type: BranchType) -> Option<Goal> {
    match branch_type {
        BranchType::Feature => Some(Goal::FeatureResetToRemote),
        BranchType::Epic => Some(Goal::EpicResetToRemote),
        _ => None,
    }
}

pub fn reset_to_remote(ctx: &mut FlowContext, branch_type: BranchType) -> Result<()> {
    let Some(goal) = goal_for(branch_type) else {
        bail!("{branch_type} branches cannot be reset to the remote");
    };
    ctx.check_breakpoint(goal)?;
    ctx.require_no_operation()?;
    if !ctx.git.has_remote() {
        return fail(FailureMessage::new(format!(
            "Remote '{}' is not configured.",
            ctx.git.remote()
        )));
    }

    ctx.git.fetch()?;
    let branch = ctx.select_branch_from(branch_type, &format!("{branch_type}Branch"), true)?;
    ctx.require_no_breakpoint(&branch)?;

    let mut stashed = false;
    if ctx.git.has_uncommitted_changes()? {
        let action = ctx.choose(
            "localChanges",
            "You have local changes. (s)tash, (d)iscard or (a)bort?",
            &["s", "d", "a"],
            Some("a"),
        )?;
        match action.as_str() {
            "s" => stashed = ctx.git.stash(&format!("gitflow: reset of {branch}"))?,
            "d" => ctx.git.reset_hard("HEAD")?,
            _ => {
                note("Reset aborted, nothing was changed");
                return Ok(());
            }
        }
    }

    let remote_ref = ctx.git.remote_ref(&branch);
    match ctx.git.compare(&branch)? {
        BranchSync::InSync => {
            ctx.git.checkout(&branch)?;
            note(&format!("'{branch}' already matches '{remote_ref}'"));
        }
        BranchSync::RemoteAhead(count) => {
            ctx.git.checkout(&branch)?;
            ctx.git.merge_ff_only(&remote_ref)?;
            info!(%branch, count, "fast-forwarded");
            done(&format!("Fast-forwarded '{branch}' by {count} commit(s)"));
        }
        BranchSync::LocalAhead(_) | BranchSync::Diverged { .. } => {
            let question = format!(
                "'{branch}' has local commits that are not on '{remote_ref}'. Discard them?"
            );
            if !ctx.confirm("discardLocalCommits", &question, false)? {
                note("Reset canceled, local commits kept");
            } else {
                ctx.git.checkout(&branch)?;
                ctx.git.reset_hard(&remote_ref)?;
                info!(%branch, "reset to remote");
                done(&format!("Reset '{branch}' to '{remote_ref}'"));
            }
        }
        BranchSync::RemoteOnly => {
            ctx.git.create_tracking_branch(&branch)?;
            ctx.git.checkout(&branch)?;
            done(&format!("Created '{branch}' from '{remote_ref}'"));
        }
        BranchSync::LocalOnly | BranchSync::Missing => {
            return fail(
                FailureMessage::new(format!("Branch '{branch}' does not exist on the remote."))
                    .solution("Push the branch first or abort it."),
            );
        }
    }

    if stashed {
        note("Your local changes are stashed; restore them with 'git stash pop'");
    }
    Ok(())
}
