//! Run state of a multi-step goal and the resume decision
//!
//! `NotStarted -> Running(step) -> Conflicted(step) | InstallFailed(step) |
//! PublishFailed(step) | Completed`. Only the interrupted states keep a
//! breakpoint across invocations; resuming goes back to `Running`, unwinding
//! to `NotStarted`.

use anyhow::{bail, Result};
use std::fmt;
use tracing::debug;

use super::kind::Breakpoint;
use super::step::{Category, Step};
use super::store::BreakpointStore;
use crate::git::{Git, OperationInProgress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running(Step),
    Conflicted(Step),
    InstallFailed(Step),
    PublishFailed(Step),
    Completed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::NotStarted => write!(f, "not started"),
            RunState::Running(step) => write!(f, "running {step}"),
            RunState::Conflicted(step) => write!(f, "conflicted in {step}"),
            RunState::InstallFailed(step) => write!(f, "install failed in {step}"),
            RunState::PublishFailed(step) => write!(f, "publishing failed in {step}"),
            RunState::Completed => write!(f, "completed"),
        }
    }
}

impl RunState {
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        match self {
            RunState::NotStarted => matches!(next, RunState::Running(_)),
            RunState::Running(_) => matches!(
                next,
                RunState::Running(_)
                    | RunState::Conflicted(_)
                    | RunState::InstallFailed(_)
                    | RunState::PublishFailed(_)
                    | RunState::Completed
            ),
            RunState::Conflicted(step)
            | RunState::InstallFailed(step)
            | RunState::PublishFailed(step) => {
                match next {
                    RunState::Running(next_step) => next_step == step,
                    RunState::NotStarted => true,
                    _ => false,
                }
            }
            RunState::Completed => false,
        }
    }

    pub fn try_transition(&self, next: RunState) -> Result<RunState> {
        if self.can_transition_to(&next) {
            Ok(next)
        } else {
            bail!("Invalid step transition: {self} -> {next}")
        }
    }

    /// Whether this state leaves a breakpoint behind.
    pub fn persists_breakpoint(&self) -> bool {
        matches!(
            self,
            RunState::Conflicted(_) | RunState::InstallFailed(_) | RunState::PublishFailed(_)
        )
    }
}

/// Repository state observed when a goal is re-invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambient {
    pub operation: OperationInProgress,
    pub current_branch: Option<String>,
    pub unmerged_files: Vec<String>,
}

impl Ambient {
    pub fn capture(git: &Git) -> Result<Self> {
        let operation = git.operation_in_progress()?;
        let unmerged_files = if operation.is_none() {
            Vec::new()
        } else {
            git.unmerged_files()?
        };
        Ok(Self {
            operation,
            current_branch: git.current_branch()?,
            unmerged_files,
        })
    }

    /// Branch being worked on: the checked out one, or the one being rebased.
    pub fn working_branch(&self) -> Option<&str> {
        match (&self.operation, &self.current_branch) {
            (OperationInProgress::Rebase { branch: Some(b) }, _) => Some(b),
            (_, Some(current)) => Some(current),
            _ => None,
        }
    }
}

/// How to continue from a breakpoint given the ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeDecision {
    /// The expected rebase is paused and resolved.
    ContinueRebase,
    /// The expected merge is paused and resolved.
    CommitMerge,
    /// Nothing in progress; continue with the remaining steps.
    Proceed,
    /// The expected operation is paused with conflicts.
    Unresolved { files: Vec<String> },
    /// Something other than the expected operation is in progress.
    Mismatch { expected: String, found: String },
}

/// The breakpoint says what was going on; the ambient state says whether
/// it can be continued.
pub fn resume_decision(breakpoint: &Breakpoint, owner: &str, ambient: &Ambient) -> ResumeDecision {
    let working = breakpoint.working_branch(owner);
    let mismatch = |expected: String| ResumeDecision::Mismatch {
        expected,
        found: ambient.operation.describe(),
    };
    let paused = |resolved: ResumeDecision| {
        if ambient.unmerged_files.is_empty() {
            resolved
        } else {
            ResumeDecision::Unresolved {
                files: ambient.unmerged_files.clone(),
            }
        }
    };

    match (breakpoint.category(), &ambient.operation) {
        (_, OperationInProgress::None) => ResumeDecision::Proceed,
        (Category::RebaseConflict, OperationInProgress::Rebase { branch })
            if branch.as_deref() == Some(working) =>
        {
            paused(ResumeDecision::ContinueRebase)
        }
        (Category::RebaseConflict, _) => mismatch(format!("a rebase of '{working}'")),
        (Category::MergeConflict, OperationInProgress::Merge { .. })
            if ambient.current_branch.as_deref() == Some(working) =>
        {
            paused(ResumeDecision::CommitMerge)
        }
        (Category::MergeConflict, _) => mismatch(format!("a merge into '{working}'")),
        (Category::InstallFailure | Category::PublishFailure, _) => {
            mismatch("no operation".to_string())
        }
    }
}

/// Drives the run state of one goal and persists breakpoints for it.
pub struct StepMachine {
    git: Git,
    owner: String,
    state: RunState,
}

impl StepMachine {
    pub fn new(git: &Git, owner: impl Into<String>) -> Self {
        Self {
            git: git.clone(),
            owner: owner.into(),
            state: RunState::NotStarted,
        }
    }

    /// Machine for a goal re-invoked on a pending breakpoint.
    pub fn resume(git: &Git, owner: impl Into<String>, breakpoint: &Breakpoint) -> Result<Self> {
        let step = breakpoint.step();
        let interrupted = match step.category() {
            Category::InstallFailure => RunState::InstallFailed(step),
            Category::PublishFailure => RunState::PublishFailed(step),
            _ => RunState::Conflicted(step),
        };
        let state = interrupted.try_transition(RunState::Running(step))?;
        Ok(Self {
            git: git.clone(),
            owner: owner.into(),
            state,
        })
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Persist `breakpoint` and start its step. Call before the operation
    /// that may be interrupted.
    pub fn enter(&mut self, breakpoint: &Breakpoint) -> Result<()> {
        self.state = self.state.try_transition(RunState::Running(breakpoint.step()))?;
        debug!(owner = %self.owner, state = %self.state, "entering step");
        BreakpointStore::new(&self.git).save(&self.owner, breakpoint)
    }

    /// The running step stopped on conflicts; its breakpoint stays.
    pub fn conflicted(&mut self) -> Result<()> {
        let step = self.running_step()?;
        self.state = self.state.try_transition(RunState::Conflicted(step))?;
        Ok(())
    }

    /// The running step's install failed; its breakpoint stays.
    pub fn install_failed(&mut self) -> Result<()> {
        let step = self.running_step()?;
        self.state = self.state.try_transition(RunState::InstallFailed(step))?;
        Ok(())
    }

    /// Pushing or remote cleanup failed; the breakpoint stays so the goal
    /// can publish again.
    pub fn publish_failed(&mut self) -> Result<()> {
        let step = self.running_step()?;
        self.state = self.state.try_transition(RunState::PublishFailed(step))?;
        Ok(())
    }

    /// All steps done; the breakpoint is removed.
    pub fn complete(&mut self) -> Result<()> {
        if self.state != RunState::NotStarted {
            self.state = self.state.try_transition(RunState::Completed)?;
        }
        BreakpointStore::new(&self.git).clear(&self.owner)
    }

    fn running_step(&self) -> Result<Step> {
        match &self.state {
            RunState::Running(step) => Ok(*step),
            other => bail!("No step is running ({other})"),
        }
    }
}
