//! `*-finish`: bring a lifecycle branch back into its base branch
//!
//! Development branches (feature, epic) first take in the base branch, drop
//! their version change through a revert, optionally install, and are then
//! merged. Release and hotfix branches are merged as they are, tagged, and
//! the base branch moves on to the next development version.
//!
//! Every step that can stop half-way is protected by a breakpoint; running
//! the goal again continues after it. The last breakpoint covers pushing and
//! remote cleanup, so a failed push can be retried.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use tracing::info;

use super::common::{done, note, FlowContext, VersionVariables};
use super::resume::{
    conflict_failure, continue_interrupted, install_failure, publish_failure, Resumed,
};
use crate::breakpoint::{Breakpoint, Operation, Phase, Step, StepMachine};
use crate::central::BranchCentralConfig;
use crate::config::CommitMessages;
use crate::error::{fail, FailureMessage, FlowError};
use crate::git::{IntegrationResult, PushMode};
use crate::models::{BranchType, Goal};

/// Steps of a finish, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    UpdateBase,
    RevertVersion,
    Install,
    MergeIntoBase,
    Tag,
    Publish,
}

/// Values shared by the steps of one finish.
struct Finish {
    branch_type: BranchType,
    branch: String,
    base: String,
    entry: BranchCentralConfig,
    old_head: String,
    old_base_head: String,
}

impl Finish {
    fn step(&self, phase: Phase) -> Step {
        Step::new(self.branch_type, Operation::Finish, phase)
    }

    fn issue_key(&self) -> String {
        self.entry.issue_number().unwrap_or("NO-ISSUE").to_string()
    }
}

pub fn finish(ctx: &mut FlowContext, branch_type: BranchType) -> Result<()> {
    let Some(goal) = Goal::finish_for(branch_type) else {
        bail!("{branch_type} branches cannot be finished");
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

    let run = Finish {
        branch_type,
        old_head: ctx.git.rev_parse(&branch)?,
        old_base_head: ctx.git.rev_parse(&base)?,
        branch,
        base,
        entry,
    };
    if branch_type.is_development() {
        require_real_changes(ctx, &run)?;
    } else {
        let tag = release_tag(ctx)?;
        if ctx.git.tag_exists(&tag) {
            return fail(
                FailureMessage::new(format!("Tag '{tag}' already exists."))
                    .solution("Change the version of the branch or delete the tag.")
                    .step(format!("git tag -d {tag}")),
            );
        }
    }

    info!(branch = %run.branch, base = %run.base, "finishing");
    let mut machine = StepMachine::new(&ctx.git, run.branch.as_str());
    run_from(ctx, &mut machine, &run, Stage::UpdateBase)
}

fn resume(ctx: &mut FlowContext, owner: &str, breakpoint: &Breakpoint) -> Result<()> {
    let entry = ctx.central().get(owner)?;
    let step = breakpoint.step();
    let (base, old_base_head, from) = match breakpoint {
        Breakpoint::FinishUpdate { .. } | Breakpoint::FinishInstall { .. } => {
            let base = ctx.base_of(&entry);
            let old_base_head = ctx.git.rev_parse(&base)?;
            let from = match step.phase {
                Phase::CleanInstall => Stage::Install,
                _ => Stage::RevertVersion,
            };
            (base, old_base_head, from)
        }
        Breakpoint::MergeIntoBase {
            base_branch,
            old_base_head,
            ..
        } => {
            let from = match step.phase {
                Phase::Publish => Stage::Publish,
                _ => Stage::Tag,
            };
            (base_branch.clone(), old_base_head.clone(), from)
        }
        _ => {
            return Err(FlowError::corrupted(format!(
                "Breakpoint {step} of '{owner}' cannot be resumed by a finish."
            ))
            .into())
        }
    };
    let run = Finish {
        branch_type: step.branch_type,
        branch: owner.to_string(),
        base,
        entry,
        old_head: breakpoint.old_head().unwrap_or_default().to_string(),
        old_base_head,
    };

    note(&format!("Continuing interrupted {step}"));
    if continue_interrupted(ctx, owner, breakpoint)? == Resumed::Aborted {
        return Ok(());
    }

    match from {
        Stage::RevertVersion => {
            if !ctx.git.is_ancestor(&run.base, &run.branch)? {
                return fail(incomplete(&step, &run.base, &run.branch));
            }
        }
        Stage::Tag => {
            if !ctx.git.is_ancestor(&run.branch, &run.base)? {
                return fail(incomplete(&step, &run.branch, &run.base));
            }
        }
        _ => {}
    }
    if from < Stage::MergeIntoBase {
        ctx.git.checkout(&run.branch)?;
    } else {
        ctx.git.checkout(&run.base)?;
    }

    let mut machine = StepMachine::resume(&ctx.git, owner, breakpoint)?;
    run_from(ctx, &mut machine, &run, from)
}

fn run_from(ctx: &mut FlowContext, machine: &mut StepMachine, run: &Finish, from: Stage) -> Result<()> {
    let development = run.branch_type.is_development();
    if development && from <= Stage::UpdateBase {
        update_base(ctx, machine, run)?;
    }
    if development && from <= Stage::RevertVersion {
        revert_version(ctx, run)?;
    }
    if from <= Stage::Install {
        install(ctx, machine, run)?;
    }
    if from <= Stage::MergeIntoBase {
        merge_into_base(ctx, machine, run)?;
    }
    if from <= Stage::Tag {
        if !development {
            tag_and_bump(ctx, run)?;
        }
        machine.enter(&Breakpoint::MergeIntoBase {
            step: run.step(Phase::Publish),
            base_branch: run.base.clone(),
            old_base_head: run.old_base_head.clone(),
            old_head: run.old_head.clone(),
        })?;
    }

    if let Err(err) = publish(ctx, run) {
        machine.publish_failed()?;
        return fail(publish_failure(&run.step(Phase::Publish), &err));
    }
    machine.complete()?;
    done(&format!("Finished '{}' into '{}'", run.branch, run.base));
    Ok(())
}

/// Push the base with its release tag and remove the finished branch.
fn publish(ctx: &FlowContext, run: &Finish) -> Result<()> {
    let mode = if run.branch_type.is_development() {
        PushMode::Normal
    } else {
        PushMode::FollowTags
    };
    ctx.push(&run.base, mode)?;
    ctx.delete_everywhere(&run.branch)?;
    ctx.central().remove(&run.branch)
}

fn update_base(ctx: &mut FlowContext, machine: &mut StepMachine, run: &Finish) -> Result<()> {
    if ctx.git.is_ancestor(&run.base, &run.branch)? {
        return Ok(());
    }

    let merge = run.branch_type == BranchType::Epic || ctx.config.workflow.update_with_merge;
    let phase = if merge {
        Phase::MergeBeforeFinish
    } else {
        Phase::RebaseBeforeFinish
    };
    let step = run.step(phase);
    machine.enter(&Breakpoint::FinishUpdate {
        step,
        old_head: run.old_head.clone(),
    })?;

    let result = if merge {
        note(&format!("Merging '{}' into '{}'", run.base, run.branch));
        let mut vars = BTreeMap::new();
        vars.insert("key", run.issue_key());
        vars.insert("base", run.base.clone());
        vars.insert("branch", run.branch.clone());
        let message = CommitMessages::render(&ctx.config.messages.update_merge, &vars);
        ctx.git.merge(&run.base, &message, false)?
    } else {
        note(&format!("Rebasing '{}' onto '{}'", run.branch, run.base));
        ctx.git.rebase(&run.base, &run.branch)?
    };

    if let IntegrationResult::Conflict { conflicting_files } = result {
        machine.conflicted()?;
        return fail(conflict_failure(&step, &run.branch, &conflicting_files));
    }
    Ok(())
}

/// Revert the version change commit so the base keeps its own version.
fn revert_version(ctx: &mut FlowContext, run: &Finish) -> Result<()> {
    if run.entry.version_change_commit().is_none() {
        return Ok(());
    }
    let Some(subject) = run.entry.start_commit_message() else {
        return Ok(());
    };
    let Some(commit) = ctx.git.find_commit_by_subject(&run.base, &run.branch, subject)? else {
        note("Version change commit not found, nothing to revert");
        return Ok(());
    };

    let mut vars = BTreeMap::new();
    vars.insert("key", run.issue_key());
    let message = CommitMessages::render(&ctx.config.messages.version_revert, &vars);
    if let IntegrationResult::Conflict { conflicting_files } = ctx.git.revert(&commit, &message)? {
        ctx.git.revert_abort()?;
        return fail(
            FailureMessage::new(format!(
                "Reverting the version change commit {commit} on '{}' conflicts in:\n  {}",
                run.branch,
                conflicting_files.join("\n  ")
            ))
            .solution("Revert the version changes manually and commit them, then run the goal again.")
            .step(format!("git revert {commit}")),
        );
    }
    Ok(())
}

fn install(ctx: &mut FlowContext, machine: &mut StepMachine, run: &Finish) -> Result<()> {
    if !ctx.config.workflow.install_project {
        return Ok(());
    }
    let step = run.step(Phase::CleanInstall);
    machine.enter(&Breakpoint::FinishInstall {
        step,
        old_head: run.old_head.clone(),
    })?;
    if !ctx.install()? {
        machine.install_failed()?;
        return fail(install_failure(&step, &run.branch));
    }
    Ok(())
}

fn merge_into_base(ctx: &mut FlowContext, machine: &mut StepMachine, run: &Finish) -> Result<()> {
    ctx.git.checkout(&run.base)?;
    let step = run.step(Phase::MergeIntoBase);
    machine.enter(&Breakpoint::MergeIntoBase {
        step,
        base_branch: run.base.clone(),
        old_base_head: run.old_base_head.clone(),
        old_head: run.old_head.clone(),
    })?;

    let mut vars = BTreeMap::new();
    vars.insert("key", run.issue_key());
    vars.insert("branch", run.branch.clone());
    let message = CommitMessages::render(&ctx.config.messages.finish_merge, &vars);
    note(&format!("Merging '{}' into '{}'", run.branch, run.base));
    if let IntegrationResult::Conflict { conflicting_files } = ctx.git.merge(&run.branch, &message, true)? {
        machine.conflicted()?;
        return fail(conflict_failure(&step, &run.base, &conflicting_files));
    }
    Ok(())
}

/// Tag the released version on the base branch and move it to the next
/// development version.
fn tag_and_bump(ctx: &mut FlowContext, run: &Finish) -> Result<()> {
    let versions = ctx.versions();
    let released = versions.release_version(&ctx.project_version()?);
    let tag = release_tag(ctx)?;
    if !ctx.git.tag_exists(&tag) {
        ctx.git.tag(&tag, &format!("Release {released}"))?;
        note(&format!("Tagged {tag}"));
    }

    let development = match ctx.properties.get("developmentVersion") {
        Some(explicit) => explicit.to_string(),
        None => {
            let next = versions.next_development_version(&released)?;
            ctx.param_default(
                "developmentVersion",
                "What is the next development version?",
                &next,
            )?
        }
    };
    let variables = VersionVariables::new(&development, &released)
        .with("baseVersion", Some(released.as_str()))
        .with("branchName", Some(run.base.as_str()));
    ctx.apply_version(&development, &variables)?;
    ctx.git.commit_tracked(&ctx.config.messages.development_version)?;
    Ok(())
}

fn release_tag(ctx: &FlowContext) -> Result<String> {
    let version = ctx.versions().release_version(&ctx.project_version()?);
    Ok(format!("{}{version}", ctx.config.version.tag_prefix))
}

/// A development branch must hold something besides its version change.
fn require_real_changes(ctx: &FlowContext, run: &Finish) -> Result<()> {
    let subject = run.entry.start_commit_message();
    for commit in ctx.git.commits_between(&run.base, &run.branch)? {
        if Some(ctx.git.commit_subject(&commit)?.as_str()) != subject {
            return Ok(());
        }
    }

    fail(
        FailureMessage::new(format!(
            "There are no real changes in {} branch '{}'.",
            run.branch_type, run.branch
        ))
        .solution("Nothing to finish, abort or commit something.")
        .with_steps(Goal::abort_for(run.branch_type).map(|abort| format!("gitflow {abort}"))),
    )
}

fn incomplete(step: &Step, source: &str, target: &str) -> FailureMessage {
    FailureMessage::new(format!(
        "The interrupted {step} was not completed: '{source}' is not part of '{target}'."
    ))
    .solution("The operation was probably aborted outside of gitflow. Abort the goal and start over.")
    .with_steps(step.abort_goal().map(|goal| format!("gitflow {goal}")))
}
