//! `feature-rebase` and `epic-update`: take in the current base branch
//!
//! The version change commit is dropped (or reverted) before the base is
//! integrated and recreated on top of the new base version afterwards, so
//! the branch version always derives from the live base version.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use tracing::info;

use super::common::{done, note, FlowContext, VersionVariables};
use super::resume::{
    conflict_failure, continue_interrupted, install_failure, publish_failure, Resumed,
};
use crate::breakpoint::{Breakpoint, Operation, Phase, Step, StepMachine, VersionState};
use crate::central::entry::{BASE_VERSION, VERSION_CHANGE_COMMIT};
use crate::central::BranchCentralConfig;
use crate::config::CommitMessages;
use crate::error::{fail, FailureMessage, FlowError};
use crate::git::{IntegrationResult, PushMode};
use crate::models::{BranchType, Goal};

struct Update {
    branch_type: BranchType,
    branch: String,
    base: String,
    entry: BranchCentralConfig,
    old_head: String,
    old: VersionState,
    merge: bool,
}

impl Update {
    fn step(&self, phase: Phase) -> Step {
        let operation = match self.branch_type {
            BranchType::Epic => Operation::Update,
            _ => Operation::Rebase,
        };
        Step::new(self.branch_type, operation, phase)
    }

    fn integration_phase(&self) -> Phase {
        if self.merge {
            Phase::Merge
        } else {
            Phase::Rebase
        }
    }

    fn issue_key(&self) -> String {
        self.entry.issue_number().unwrap_or("NO-ISSUE").to_string()
    }
}

fn goal_for(branch_type: BranchType) -> Option<Goal> {
    match branch_type {
        BranchType::Feature => Some(Goal::FeatureRebase),
        BranchType::Epic => Some(Goal::EpicUpdate),
        _ => None,
    }
}

pub fn update(ctx: &mut FlowContext, branch_type: BranchType) -> Result<()> {
    let Some(goal) = goal_for(branch_type) else {
        bail!("{branch_type} branches cannot be updated");
    };
    if let Some((owner, breakpoint)) = ctx.check_breakpoint(goal)? {
        return resume(ctx, &owner, &breakpoint);
    }

    ctx.require_no_operation()?;
    ctx.require_clean_tree()?;
    let branch = ctx.select_branch(branch_type, &format!("{branch_type}Branch"))?;
    if let Some((owner, breakpoint)) = ctx.check_branch_breakpoint(goal, &branch)? {
        return resume(ctx, &owner, &breakpoint);
    }
    ctx.fetch()?;
    ctx.ensure_synced(&branch)?;
    let entry = ctx.central().get(&branch)?;
    let base = ctx.base_of(&entry);
    ctx.ensure_synced(&base)?;
    ctx.git.checkout(&branch)?;

    if ctx.git.is_ancestor(&base, &branch)? {
        note(&format!("'{branch}' is already up to date with '{base}'"));
        return Ok(());
    }

    let run = Update {
        branch_type,
        old_head: ctx.git.rev_parse(&branch)?,
        old: VersionState {
            base_version: entry.base_version().map(String::from),
            version_change_commit: entry.version_change_commit().map(String::from),
        },
        merge: branch_type == BranchType::Epic || ctx.config.workflow.update_with_merge,
        branch,
        base,
        entry,
    };

    info!(branch = %run.branch, base = %run.base, merge = run.merge, "updating");
    let mut machine = StepMachine::new(&ctx.git, run.branch.as_str());
    let step = run.step(run.integration_phase());
    machine.enter(&Breakpoint::Update {
        step,
        old_head: run.old_head.clone(),
        old: run.old.clone(),
    })?;

    let version_commit = locate_version_commit(ctx, &run)?;
    let result = if run.merge {
        if let Some(commit) = &version_commit {
            revert_version_commit(ctx, &run, commit)?;
        }
        note(&format!("Merging '{}' into '{}'", run.base, run.branch));
        let mut vars = BTreeMap::new();
        vars.insert("key", run.issue_key());
        vars.insert("base", run.base.clone());
        vars.insert("branch", run.branch.clone());
        let message = CommitMessages::render(&ctx.config.messages.update_merge, &vars);
        ctx.git.merge(&run.base, &message, false)?
    } else {
        note(&format!("Rebasing '{}' onto '{}'", run.branch, run.base));
        rebase_without(ctx, &run, version_commit.as_deref())?
    };

    if let IntegrationResult::Conflict { conflicting_files } = result {
        machine.conflicted()?;
        return fail(conflict_failure(&step, &run.branch, &conflicting_files));
    }
    after_integration(ctx, &mut machine, &run)
}

fn resume(ctx: &mut FlowContext, owner: &str, breakpoint: &Breakpoint) -> Result<()> {
    let step = breakpoint.step();
    let (old_head, old) = match breakpoint {
        Breakpoint::Update { old_head, old, .. } | Breakpoint::UpdateInstall { old_head, old, .. } => {
            (old_head, old)
        }
        _ => {
            return Err(FlowError::corrupted(format!(
                "Breakpoint {step} of '{owner}' cannot be resumed by an update."
            ))
            .into())
        }
    };
    let entry = ctx.central().get(owner)?;
    let run = Update {
        branch_type: step.branch_type,
        branch: owner.to_string(),
        base: ctx.base_of(&entry),
        entry,
        old_head: old_head.clone(),
        old: old.clone(),
        merge: match step.phase {
            Phase::Merge => true,
            Phase::Rebase => false,
            _ => step.branch_type == BranchType::Epic || ctx.config.workflow.update_with_merge,
        },
    };

    note(&format!("Continuing interrupted {step}"));
    if continue_interrupted(ctx, owner, breakpoint)? == Resumed::Aborted {
        return Ok(());
    }
    if !ctx.git.is_ancestor(&run.base, &run.branch)? {
        return fail(
            FailureMessage::new(format!(
                "The interrupted {step} was not completed: '{}' is not part of '{}'.",
                run.base, run.branch
            ))
            .solution("The operation was probably aborted outside of gitflow. Abort the goal and start over.")
            .with_steps(step.abort_goal().map(|goal| format!("gitflow {goal}"))),
        );
    }
    ctx.git.checkout(&run.branch)?;

    let mut machine = StepMachine::resume(&ctx.git, owner, breakpoint)?;
    match breakpoint {
        Breakpoint::UpdateInstall { new, .. } if step.phase == Phase::Publish => {
            publish(ctx, &mut machine, &run, new.clone())
        }
        Breakpoint::UpdateInstall { new, .. } => {
            install_and_publish(ctx, &mut machine, &run, new.clone())
        }
        _ => after_integration(ctx, &mut machine, &run),
    }
}

/// Version change commit still present in `base..branch`.
fn locate_version_commit(ctx: &FlowContext, run: &Update) -> Result<Option<String>> {
    if run.old.version_change_commit.is_none() {
        return Ok(None);
    }
    match run.entry.start_commit_message() {
        Some(subject) => ctx.git.find_commit_by_subject(&run.base, &run.branch, subject),
        None => Ok(None),
    }
}

/// Rebase onto the base, leaving out the version change commit when it is
/// the first commit of the branch and reverting it otherwise.
fn rebase_without(ctx: &FlowContext, run: &Update, version_commit: Option<&str>) -> Result<IntegrationResult> {
    let Some(commit) = version_commit else {
        return ctx.git.rebase(&run.base, &run.branch);
    };
    let commits = ctx.git.commits_between(&run.base, &run.branch)?;
    if commits.last().map(String::as_str) == Some(commit) {
        return ctx.git.rebase_onto(&run.base, commit, &run.branch);
    }
    revert_version_commit(ctx, run, commit)?;
    ctx.git.rebase(&run.base, &run.branch)
}

fn revert_version_commit(ctx: &FlowContext, run: &Update, commit: &str) -> Result<()> {
    let mut vars = BTreeMap::new();
    vars.insert("key", run.issue_key());
    let message = CommitMessages::render(&ctx.config.messages.version_revert, &vars);
    if let IntegrationResult::Conflict { conflicting_files } = ctx.git.revert(commit, &message)? {
        ctx.git.revert_abort()?;
        return fail(
            FailureMessage::new(format!(
                "Reverting the version change commit {commit} on '{}' conflicts in:\n  {}",
                run.branch,
                conflicting_files.join("\n  ")
            ))
            .solution("Abort the goal, revert the version changes manually and run it again.")
            .with_steps(run.step(run.integration_phase()).abort_goal().map(|goal| format!("gitflow {goal}"))),
        );
    }
    Ok(())
}

/// Re-derive the base version and recreate the version change commit.
fn after_integration(ctx: &mut FlowContext, machine: &mut StepMachine, run: &Update) -> Result<()> {
    let base_version = ctx.project_version()?;
    let mut version_change_commit = None;

    if run.old.version_change_commit.is_some() && !ctx.config.version.skip_version(run.branch_type) {
        let descriptor = ctx.describe(&run.branch);
        let issue = run
            .entry
            .issue_number()
            .map(String::from)
            .or_else(|| descriptor.as_ref().and_then(|d| d.issue_key.clone()));
        let version = match &issue {
            Some(issue) => ctx.versions().start_version(run.branch_type, &base_version, issue),
            None => descriptor
                .map(|d| d.identifier)
                .unwrap_or_else(|| base_version.clone()),
        };
        let variables = VersionVariables::new(&version, &base_version)
            .with("baseVersion", Some(base_version.as_str()))
            .with("issueNumber", issue.as_deref())
            .with("branchName", Some(run.branch.as_str()));
        ctx.apply_version(&version, &variables)?;

        let message = match run.entry.start_commit_message() {
            Some(message) => message.to_string(),
            None => {
                let mut vars = BTreeMap::new();
                vars.insert("key", run.issue_key());
                vars.insert("branch", run.branch.clone());
                CommitMessages::render(ctx.config.messages.start(run.branch_type), &vars)
            }
        };
        version_change_commit = ctx.git.commit_tracked(&message)?;
        note(&format!("Project version set to {version}"));
    }

    let new = VersionState {
        base_version: Some(base_version),
        version_change_commit,
    };
    install_and_publish(ctx, machine, run, new)
}

fn install_and_publish(
    ctx: &mut FlowContext,
    machine: &mut StepMachine,
    run: &Update,
    new: VersionState,
) -> Result<()> {
    if ctx.config.workflow.install_project {
        let step = run.step(Phase::CleanInstall);
        machine.enter(&Breakpoint::UpdateInstall {
            step,
            old_head: run.old_head.clone(),
            old: run.old.clone(),
            new: new.clone(),
        })?;
        if !ctx.install()? {
            machine.install_failed()?;
            return fail(install_failure(&step, &run.branch));
        }
    }
    publish(ctx, machine, run, new)
}

/// Record the new version state centrally and push the branch. Both stay
/// behind a breakpoint until they went through.
fn publish(ctx: &FlowContext, machine: &mut StepMachine, run: &Update, new: VersionState) -> Result<()> {
    let step = run.step(Phase::Publish);
    machine.enter(&Breakpoint::UpdateInstall {
        step,
        old_head: run.old_head.clone(),
        old: run.old.clone(),
        new: new.clone(),
    })?;
    if let Err(err) = persist(ctx, run, new) {
        machine.publish_failed()?;
        return fail(publish_failure(&step, &err));
    }
    machine.complete()?;
    done(&format!("Updated '{}' with '{}'", run.branch, run.base));
    Ok(())
}

fn persist(ctx: &FlowContext, run: &Update, new: VersionState) -> Result<()> {
    let mut values = BTreeMap::new();
    values.insert(BASE_VERSION, new.base_version);
    values.insert(VERSION_CHANGE_COMMIT, new.version_change_commit);
    ctx.central().set_values(&run.branch, &values)?;

    let mode = if run.merge {
        PushMode::Normal
    } else {
        PushMode::ForceWithLease
    };
    ctx.push(&run.branch, mode)
}
