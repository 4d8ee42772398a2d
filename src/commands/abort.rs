//! Abort goals
//!
//! `*-rebase-abort`, `*-update-abort` and `*-integrate-abort` unwind the
//! matching interrupted operation. Lifecycle `*-abort` abandons a branch,
//! unwinding whatever interrupted operation of it is pending first.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use tracing::info;

use super::common::{done, note, FlowContext};
use crate::breakpoint::{Ambient, Breakpoint, Phase, VersionState};
use crate::central::entry::{BASE_VERSION, VERSION_CHANGE_COMMIT};
use crate::error::{fail, FailureMessage};
use crate::git::OperationInProgress;
use crate::models::{BranchType, Goal};

/// Lifecycle abort: drop the branch, its remote counterpart and its entry.
pub fn abort(ctx: &mut FlowContext, branch_type: BranchType) -> Result<()> {
    let Some(goal) = Goal::abort_for(branch_type) else {
        bail!("{branch_type} branches cannot be aborted");
    };
    let (branch, pending) = match ctx.check_breakpoint(goal)? {
        Some((owner, breakpoint)) => (owner.clone(), Some((owner, breakpoint))),
        None => {
            ctx.require_no_operation()?;
            let Some(branch) = branch_to_abort(ctx, branch_type)? else {
                return nothing_to_abort(goal);
            };
            let pending = ctx.check_branch_breakpoint(goal, &branch)?;
            (branch, pending)
        }
    };

    let question = match &pending {
        Some((_, breakpoint)) => format!(
            "Abort {branch_type} branch '{branch}' and its interrupted {}? Its commits and local changes are lost.",
            breakpoint.step()
        ),
        None => format!("Abort {branch_type} branch '{branch}'? Its commits and local changes are lost."),
    };
    if !ctx.confirm("confirmAbort", &question, true)? {
        note("Abort canceled");
        return Ok(());
    }
    if let Some((owner, breakpoint)) = &pending {
        unwind(ctx, owner, breakpoint)?;
    }
    ctx.require_no_operation()?;

    let base = ctx.base_of(&ctx.central().get(&branch)?);
    if ctx.git.current_branch()?.as_deref() == Some(branch.as_str()) {
        ctx.git.reset_hard("HEAD")?;
        ctx.git.checkout(&base)?;
    }

    info!(%branch, "abandoning branch");
    ctx.delete_everywhere(&branch)?;
    ctx.central().remove(&branch)?;
    ctx.breakpoints().clear(&branch)?;
    done(&format!("Aborted {branch_type} branch '{branch}'"));
    Ok(())
}

/// Unwind the interrupted operation `goal` belongs to.
pub fn abort_operation(ctx: &mut FlowContext, goal: Goal) -> Result<()> {
    let pending = match ctx.check_breakpoint(goal)? {
        Some(found) => Some(found),
        // A detached rebase of the temporary branch is not tied to the
        // owner's name; look the breakpoint up directly.
        None if goal == Goal::FeatureIntegrateAbort => ctx
            .breakpoints()
            .list()?
            .into_iter()
            .find(|(_, breakpoint)| matches!(breakpoint, Breakpoint::Integrate { .. })),
        None => None,
    };
    let Some((owner, breakpoint)) =
        pending.filter(|(_, breakpoint)| breakpoint.step().abort_goal() == Some(goal))
    else {
        return nothing_to_abort(goal);
    };

    let step = breakpoint.step();
    if !ctx.confirm("confirmAbort", &format!("Abort the interrupted {step} of '{owner}'?"), true)? {
        note("Abort canceled");
        return Ok(());
    }
    unwind(ctx, &owner, &breakpoint)?;
    done(&format!("Aborted {step} of '{owner}'"));
    Ok(())
}

/// Undo what the interrupted operation did and clear its breakpoint. Local
/// work that only waits to be published is kept.
pub fn unwind(ctx: &mut FlowContext, owner: &str, breakpoint: &Breakpoint) -> Result<()> {
    let ambient = Ambient::capture(&ctx.git)?;
    let step = breakpoint.step();
    info!(owner, %step, "unwinding");

    match breakpoint {
        Breakpoint::MergeIntoBase { base_branch: target, .. }
        | Breakpoint::Integrate {
            target_branch: target,
            ..
        } if step.phase == Phase::Publish => {
            note(&format!(
                "'{owner}' is already part of the local '{target}'; only publishing is dropped"
            ));
        }
        Breakpoint::Integrate {
            source_branch,
            temp_branch,
            ..
        } => {
            match &ambient.operation {
                OperationInProgress::None => {}
                OperationInProgress::Rebase { branch } if branch.as_deref() == Some(temp_branch.as_str()) => {
                    ctx.git.rebase_abort()?;
                }
                other => return foreign_operation(owner, temp_branch, other),
            }
            if ctx.git.current_branch()?.as_deref() != Some(source_branch.as_str()) {
                ctx.git.checkout(source_branch)?;
            }
            if ctx.git.branch_exists(temp_branch) {
                ctx.git.delete_branch(temp_branch)?;
            }
        }
        Breakpoint::FinishUpdate { old_head, .. } | Breakpoint::FinishInstall { old_head, .. } => {
            abort_paused(ctx, &ambient, owner, breakpoint.working_branch(owner))?;
            restore_tip(ctx, owner, old_head)?;
            ctx.git.checkout(owner)?;
        }
        Breakpoint::MergeIntoBase {
            base_branch,
            old_base_head,
            old_head,
            ..
        } => {
            abort_paused(ctx, &ambient, owner, base_branch)?;
            restore_tip(ctx, base_branch, old_base_head)?;
            restore_tip(ctx, owner, old_head)?;
            ctx.git.checkout(owner)?;
        }
        Breakpoint::Update { old_head, old, .. } | Breakpoint::UpdateInstall { old_head, old, .. } => {
            abort_paused(ctx, &ambient, owner, owner)?;
            restore_tip(ctx, owner, old_head)?;
            ctx.git.checkout(owner)?;
            restore_versions(ctx, owner, old)?;
        }
    }

    ctx.breakpoints().clear(owner)
}

/// Abort the paused rebase, merge or revert the breakpoint expects on
/// `working`; anything else belongs to someone else and is left alone.
fn abort_paused(ctx: &FlowContext, ambient: &Ambient, owner: &str, working: &str) -> Result<()> {
    match &ambient.operation {
        OperationInProgress::None => Ok(()),
        OperationInProgress::Rebase { branch } if branch.as_deref() == Some(working) => {
            ctx.git.rebase_abort()
        }
        OperationInProgress::Merge { .. } if ambient.current_branch.as_deref() == Some(working) => {
            ctx.git.merge_abort()
        }
        OperationInProgress::Revert if ambient.current_branch.as_deref() == Some(working) => {
            ctx.git.revert_abort()
        }
        other => foreign_operation(owner, working, other),
    }
}

/// Move `branch` back to `rev`, whether or not it is checked out.
fn restore_tip(ctx: &FlowContext, branch: &str, rev: &str) -> Result<()> {
    if ctx.git.current_branch()?.as_deref() == Some(branch) {
        ctx.git.reset_hard(rev)
    } else {
        ctx.git.force_branch(branch, rev)
    }
}

fn restore_versions(ctx: &FlowContext, owner: &str, old: &VersionState) -> Result<()> {
    let mut values = BTreeMap::new();
    values.insert(BASE_VERSION, old.base_version.clone());
    values.insert(VERSION_CHANGE_COMMIT, old.version_change_commit.clone());
    ctx.central().set_values(owner, &values)
}

fn branch_to_abort(ctx: &mut FlowContext, branch_type: BranchType) -> Result<Option<String>> {
    if let Some(current) = ctx.git.current_branch()? {
        if ctx.describe(&current).map(|d| d.branch_type) == Some(branch_type) {
            return Ok(Some(current));
        }
    }
    let prefix = ctx.config.branches.prefix(branch_type).to_string();
    let candidates = ctx.git.list_branches(&prefix)?;
    if candidates.is_empty() {
        return Ok(None);
    }
    let choices: Vec<&str> = candidates.iter().map(String::as_str).collect();
    let chosen = ctx.choose(
        &format!("{branch_type}Branch"),
        &format!("Which {branch_type} branch should be aborted?"),
        &choices,
        None,
    )?;
    Ok(Some(chosen))
}

fn nothing_to_abort(goal: Goal) -> Result<()> {
    fail(FailureMessage::new(format!("There is nothing to abort for '{goal}'.")))
}

fn foreign_operation(owner: &str, expected: &str, found: &OperationInProgress) -> Result<()> {
    fail(
        FailureMessage::new(format!(
            "The repository is in the middle of {}, which does not belong to the interrupted operation of '{owner}' on '{expected}'.",
            found.describe()
        ))
        .solution("Nothing was changed. Finish or abort that operation with git first, then run the abort again.")
        .step("git status"),
    )
}
