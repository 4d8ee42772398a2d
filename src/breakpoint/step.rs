//! Resumable step identifiers (`featureFinish.rebaseBeforeFinish`)

use std::fmt;

use crate::models::{BranchType, Goal};

/// Multi-step operation a breakpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Finish,
    Rebase,
    Update,
    Integrate,
}

impl Operation {
    const ALL: [Operation; 4] = [
        Operation::Finish,
        Operation::Rebase,
        Operation::Update,
        Operation::Integrate,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Operation::Finish => "Finish",
            Operation::Rebase => "Rebase",
            Operation::Update => "Update",
            Operation::Integrate => "Integrate",
        }
    }
}

/// Sub-step that stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RebaseBeforeFinish,
    MergeBeforeFinish,
    CleanInstall,
    MergeIntoBase,
    Rebase,
    Merge,
    /// Local work is done; pushing and remote cleanup remain.
    Publish,
}

impl Phase {
    const ALL: [Phase; 7] = [
        Phase::RebaseBeforeFinish,
        Phase::MergeBeforeFinish,
        Phase::CleanInstall,
        Phase::MergeIntoBase,
        Phase::Rebase,
        Phase::Merge,
        Phase::Publish,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Phase::RebaseBeforeFinish => "rebaseBeforeFinish",
            Phase::MergeBeforeFinish => "mergeBeforeFinish",
            Phase::CleanInstall => "cleanInstall",
            Phase::MergeIntoBase => "mergeIntoBase",
            Phase::Rebase => "rebase",
            Phase::Merge => "merge",
            Phase::Publish => "publish",
        }
    }
}

/// What kind of interruption a breakpoint records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    RebaseConflict,
    MergeConflict,
    InstallFailure,
    PublishFailure,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::RebaseConflict => "rebase conflict",
            Category::MergeConflict => "merge conflict",
            Category::InstallFailure => "install failure",
            Category::PublishFailure => "publish failure",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub branch_type: BranchType,
    pub operation: Operation,
    pub phase: Phase,
}

impl Step {
    pub fn new(branch_type: BranchType, operation: Operation, phase: Phase) -> Self {
        Self {
            branch_type,
            operation,
            phase,
        }
    }

    pub fn id(&self) -> String {
        format!(
            "{}{}.{}",
            self.branch_type.as_str(),
            self.operation.as_str(),
            self.phase.as_str()
        )
    }

    pub fn parse(id: &str) -> Option<Self> {
        let (goal, phase) = id.split_once('.')?;
        let phase = Phase::ALL.into_iter().find(|p| p.as_str() == phase)?;
        BranchType::ALL.into_iter().find_map(|branch_type| {
            let operation = goal.strip_prefix(branch_type.as_str())?;
            let operation = Operation::ALL.into_iter().find(|o| o.as_str() == operation)?;
            Some(Self::new(branch_type, operation, phase))
        })
    }

    pub fn category(&self) -> Category {
        match self.phase {
            Phase::RebaseBeforeFinish | Phase::Rebase => Category::RebaseConflict,
            Phase::MergeBeforeFinish | Phase::Merge | Phase::MergeIntoBase => Category::MergeConflict,
            Phase::CleanInstall => Category::InstallFailure,
            Phase::Publish => Category::PublishFailure,
        }
    }

    /// Goal that resumes this step.
    pub fn goal(&self) -> Option<Goal> {
        match (self.operation, self.branch_type) {
            (Operation::Finish, t) => Goal::finish_for(t),
            (Operation::Rebase, BranchType::Feature) => Some(Goal::FeatureRebase),
            (Operation::Update, BranchType::Epic) => Some(Goal::EpicUpdate),
            (Operation::Integrate, BranchType::Feature) => Some(Goal::FeatureIntegrate),
            _ => None,
        }
    }

    /// Goal that unwinds this step.
    pub fn abort_goal(&self) -> Option<Goal> {
        match (self.operation, self.branch_type) {
            (Operation::Finish, t) => Goal::abort_for(t),
            (Operation::Rebase, BranchType::Feature) => Some(Goal::FeatureRebaseAbort),
            (Operation::Update, BranchType::Epic) => Some(Goal::EpicUpdateAbort),
            (Operation::Integrate, BranchType::Feature) => Some(Goal::FeatureIntegrateAbort),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}
