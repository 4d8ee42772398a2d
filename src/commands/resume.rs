//! Re-invoking a goal on its own breakpoint
//!
//! The breakpoint says which step stopped; the repository says whether it
//! can be continued. Conflicts that are still unresolved keep the
//! breakpoint; interactively the user may unwind instead.

use anyhow::Result;

use super::abort::unwind;
use super::common::{note, FlowContext};
use crate::breakpoint::{resume_decision, Ambient, Breakpoint, Category, ResumeDecision, Step};
use crate::error::{fail, FailureMessage};
use crate::git::IntegrationResult;

/// What happened to the interrupted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resumed {
    /// The paused operation is complete; the remaining steps can run.
    Continue,
    /// The user chose to unwind the operation instead.
    Aborted,
}

pub fn continue_interrupted(
    ctx: &mut FlowContext,
    owner: &str,
    breakpoint: &Breakpoint,
) -> Result<Resumed> {
    let ambient = Ambient::capture(&ctx.git)?;
    let step = breakpoint.step();

    match resume_decision(breakpoint, owner, &ambient) {
        ResumeDecision::Unresolved { files } => {
            let question = format!(
                "Conflicts of {step} are not resolved yet. Resolve them or abort the operation?"
            );
            let action =
                ctx.choose("conflictAction", &question, &["resolve", "abort"], Some("resolve"))?;
            if action == "abort" {
                unwind(ctx, owner, breakpoint)?;
                return Ok(Resumed::Aborted);
            }
            fail(unresolved(&step, breakpoint.working_branch(owner), &files))
        }
        ResumeDecision::Mismatch { expected, found } => fail(
            FailureMessage::new(format!(
                "Branch '{owner}' has an interrupted {step} that expects {expected}, but the repository is in {found}."
            ))
            .solution("Finish or abort the other operation first, then run the goal again.")
            .step("git status"),
        ),
        ResumeDecision::ContinueRebase => {
            note("Continuing rebase");
            match ctx.git.rebase_continue()? {
                IntegrationResult::Clean => Ok(Resumed::Continue),
                IntegrationResult::Conflict { conflicting_files } => fail(unresolved(
                    &step,
                    breakpoint.working_branch(owner),
                    &conflicting_files,
                )),
            }
        }
        ResumeDecision::CommitMerge => {
            note("Committing merge");
            ctx.git.merge_commit()?;
            Ok(Resumed::Continue)
        }
        ResumeDecision::Proceed => Ok(Resumed::Continue),
    }
}

/// Failure for a step that just stopped on conflicts.
pub fn conflict_failure(step: &Step, branch: &str, files: &[String]) -> FailureMessage {
    let what = match step.category() {
        Category::RebaseConflict => "Automatic rebase failed",
        _ => "Automatic merge failed",
    };
    with_remedy(
        FailureMessage::new(format!(
            "{what} on branch '{branch}'. Conflicting files:\n{}",
            file_list(files)
        )),
        step,
    )
}

/// Failure for a step whose conflicts were not resolved yet.
pub fn unresolved(step: &Step, branch: &str, files: &[String]) -> FailureMessage {
    with_remedy(
        FailureMessage::new(format!(
            "Unresolved conflicts remain on branch '{branch}':\n{}",
            file_list(files)
        )),
        step,
    )
}

/// Failure for a project install that did not succeed.
pub fn install_failure(step: &Step, branch: &str) -> FailureMessage {
    FailureMessage::new(format!("Installation of branch '{branch}' failed."))
        .solution("Fix the build and commit the fix, then run the goal again to continue.")
        .with_steps(goal_commands(step))
}

/// Failure for pushing or remote cleanup that did not go through. The local
/// result is complete.
pub fn publish_failure(step: &Step, err: &anyhow::Error) -> FailureMessage {
    FailureMessage::new(format!("Publishing the result of {step} failed: {err:#}"))
        .solution("Fix the access to the remote repository, then run the goal again to retry.")
        .with_steps(goal_commands(step))
}

fn with_remedy(message: FailureMessage, step: &Step) -> FailureMessage {
    message
        .solution("Fix the conflicts and mark them resolved, then run the goal again to continue, or abort it.")
        .step("git status")
        .step("git add <resolved files>")
        .with_steps(goal_commands(step))
}

/// `gitflow <goal>` commands that continue and unwind `step`.
pub fn goal_commands(step: &Step) -> Vec<String> {
    [step.goal(), step.abort_goal()]
        .into_iter()
        .flatten()
        .map(|goal| format!("gitflow {goal}"))
        .collect()
}

fn file_list(files: &[String]) -> String {
    files
        .iter()
        .map(|file| format!("  {file}"))
        .collect::<Vec<_>>()
        .join("\n")
}
