//! `feature-integrate`: move one feature onto another
//!
//! The source feature is copied to a throwaway branch and rebased onto the
//! target feature without its version change commit. When the rebase is
//! done the target is fast-forwarded and the source disappears. Pushing the
//! target and removing the source stay behind a breakpoint until they went
//! through.

use anyhow::Result;
use std::collections::BTreeMap;
use tracing::info;

use super::common::{done, note, FlowContext};
use super::resume::{conflict_failure, continue_interrupted, publish_failure, Resumed};
use crate::breakpoint::{Breakpoint, Operation, Phase, Step, StepMachine};
use crate::config::CommitMessages;
use crate::error::{fail, FailureMessage, FlowError};
use crate::git::{IntegrationResult, PushMode};
use crate::models::{BranchType, Goal};

fn integrate_step(phase: Phase) -> Step {
    Step::new(BranchType::Feature, Operation::Integrate, phase)
}

pub fn integrate(ctx: &mut FlowContext) -> Result<()> {
    if let Some((owner, breakpoint)) = ctx.check_breakpoint(Goal::FeatureIntegrate)? {
        return resume(ctx, &owner, &breakpoint);
    }

    ctx.require_no_operation()?;
    ctx.require_clean_tree()?;
    let source = ctx.select_branch(BranchType::Feature, "featureBranch")?;
    if let Some((owner, breakpoint)) = ctx.check_branch_breakpoint(Goal::FeatureIntegrate, &source)? {
        return resume(ctx, &owner, &breakpoint);
    }
    ctx.fetch()?;
    ctx.ensure_synced(&source)?;

    let prefix = ctx.config.branches.prefix(BranchType::Feature).to_string();
    let targets: Vec<String> = ctx
        .git
        .list_branches(&prefix)?
        .into_iter()
        .filter(|branch| *branch != source)
        .collect();
    if targets.is_empty() {
        return fail(
            FailureMessage::new(format!("There is no feature branch to integrate '{source}' into."))
                .solution("Start the target feature branch first."),
        );
    }
    let choices: Vec<&str> = targets.iter().map(String::as_str).collect();
    let target = ctx.choose(
        "targetFeatureBranch",
        &format!("Which feature branch should '{source}' be integrated into?"),
        &choices,
        None,
    )?;
    ctx.require_no_breakpoint(&target)?;
    ctx.ensure_synced(&target)?;

    let entry = ctx.central().get(&source)?;
    let base = ctx.base_of(&entry);
    let temp = ctx.config.branches.temp_branch(&source);
    ctx.git.force_branch(&temp, &source)?;

    info!(%source, %target, %temp, "integrating");
    let step = integrate_step(Phase::Rebase);
    let mut machine = StepMachine::new(&ctx.git, source.as_str());
    machine.enter(&Breakpoint::Integrate {
        step,
        source_branch: source.clone(),
        target_branch: target.clone(),
        temp_branch: temp.clone(),
    })?;

    // Commits after `upstream` are the ones the source adds to its base.
    let mut upstream = ctx.git.merge_base(&base, &source)?.unwrap_or(base);
    let version_commit = match (entry.version_change_commit(), entry.start_commit_message()) {
        (Some(_), Some(subject)) => ctx.git.find_commit_by_subject(&upstream, &source, subject)?,
        _ => None,
    };
    if let Some(commit) = version_commit {
        let commits = ctx.git.commits_between(&upstream, &source)?;
        if commits.last() == Some(&commit) {
            upstream = commit;
        } else {
            ctx.git.checkout(&temp)?;
            let mut vars = BTreeMap::new();
            vars.insert("key", entry.issue_number().unwrap_or("NO-ISSUE").to_string());
            let message = CommitMessages::render(&ctx.config.messages.version_revert, &vars);
            if let IntegrationResult::Conflict { .. } = ctx.git.revert(&commit, &message)? {
                ctx.git.revert_abort()?;
                return fail(
                    FailureMessage::new(format!(
                        "The version change commit {commit} of '{source}' cannot be reverted."
                    ))
                    .solution("Abort the integration and revert the version changes manually.")
                    .step(format!("gitflow {}", Goal::FeatureIntegrateAbort)),
                );
            }
        }
    }

    note(&format!("Rebasing '{source}' onto '{target}'"));
    if let IntegrationResult::Conflict { conflicting_files } = ctx.git.rebase_onto(&target, &upstream, &temp)? {
        machine.conflicted()?;
        return fail(conflict_failure(&step, &temp, &conflicting_files));
    }
    fast_forward(ctx, &mut machine, &source, &target, &temp)
}

fn resume(ctx: &mut FlowContext, owner: &str, breakpoint: &Breakpoint) -> Result<()> {
    let Breakpoint::Integrate {
        step,
        source_branch,
        target_branch,
        temp_branch,
    } = breakpoint
    else {
        return Err(FlowError::corrupted(format!(
            "Breakpoint {} of '{owner}' cannot be resumed by an integration.",
            breakpoint.step()
        ))
        .into());
    };

    note(&format!("Continuing interrupted {step}"));
    if continue_interrupted(ctx, owner, breakpoint)? == Resumed::Aborted {
        return Ok(());
    }
    let mut machine = StepMachine::resume(&ctx.git, owner, breakpoint)?;
    if step.phase == Phase::Publish {
        return publish(ctx, &mut machine, source_branch, target_branch);
    }
    if !ctx.git.is_ancestor(target_branch, temp_branch)? {
        return fail(
            FailureMessage::new(format!(
                "The interrupted {step} was not completed: '{temp_branch}' is not based on '{target_branch}'."
            ))
            .solution("The rebase was probably aborted outside of gitflow. Abort the integration and start over.")
            .step(format!("gitflow {}", Goal::FeatureIntegrateAbort)),
        );
    }

    fast_forward(ctx, &mut machine, source_branch, target_branch, temp_branch)
}

fn fast_forward(
    ctx: &mut FlowContext,
    machine: &mut StepMachine,
    source: &str,
    target: &str,
    temp: &str,
) -> Result<()> {
    ctx.git.checkout(target)?;
    ctx.git.merge_ff_only(temp)?;
    machine.enter(&Breakpoint::Integrate {
        step: integrate_step(Phase::Publish),
        source_branch: source.to_string(),
        target_branch: target.to_string(),
        temp_branch: temp.to_string(),
    })?;
    ctx.git.delete_branch(temp)?;
    publish(ctx, machine, source, target)
}

fn publish(ctx: &FlowContext, machine: &mut StepMachine, source: &str, target: &str) -> Result<()> {
    let pushed = ctx
        .push(target, PushMode::Normal)
        .and_then(|()| ctx.delete_everywhere(source))
        .and_then(|()| ctx.central().remove(source));
    if let Err(err) = pushed {
        machine.publish_failed()?;
        return fail(publish_failure(&integrate_step(Phase::Publish), &err));
    }
    machine.complete()?;
    done(&format!("Integrated '{source}' into '{target}'"));
    Ok(())
}
