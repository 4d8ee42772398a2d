//! Breakpoint variants and their key/value form

use anyhow::Result;

use super::step::{Category, Operation, Phase, Step};
use crate::error::FlowError;

pub const BREAKPOINT: &str = "breakpoint";
pub const OLD_BASE_VERSION: &str = "oldBaseVersion";
pub const OLD_VERSION_CHANGE_COMMIT: &str = "oldVersionChangeCommit";
pub const NEW_BASE_VERSION: &str = "newBaseVersion";
pub const NEW_VERSION_CHANGE_COMMIT: &str = "newVersionChangeCommit";
pub const MERGE_TARGET_BRANCH: &str = "mergeTargetBranch";
pub const OLD_MERGE_TARGET_HEAD: &str = "oldMergeTargetHEAD";
pub const SOURCE_FEATURE_BRANCH: &str = "sourceFeatureBranch";
pub const TARGET_FEATURE_BRANCH: &str = "targetFeatureBranch";
pub const TEMP_BRANCH: &str = "tempBranch";

/// Keys a breakpoint may use besides `old<Type>HEAD`.
pub const EXTRA_KEYS: [&str; 10] = [
    BREAKPOINT,
    OLD_BASE_VERSION,
    OLD_VERSION_CHANGE_COMMIT,
    NEW_BASE_VERSION,
    NEW_VERSION_CHANGE_COMMIT,
    MERGE_TARGET_BRANCH,
    OLD_MERGE_TARGET_HEAD,
    SOURCE_FEATURE_BRANCH,
    TARGET_FEATURE_BRANCH,
    TEMP_BRANCH,
];

/// Saved version state of a branch: its base version and version commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionState {
    pub base_version: Option<String>,
    pub version_change_commit: Option<String>,
}

/// Where a multi-step operation stopped and what is needed to go on or back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Breakpoint {
    /// Base branch rebased or merged into the branch before finishing.
    FinishUpdate { step: Step, old_head: String },
    /// Install failed before merging into the base branch.
    FinishInstall { step: Step, old_head: String },
    /// Merge of the branch into its base branch.
    MergeIntoBase {
        step: Step,
        base_branch: String,
        old_base_head: String,
        old_head: String,
    },
    /// Rebase or merge of `*-rebase` / `*-update`.
    Update {
        step: Step,
        old_head: String,
        old: VersionState,
    },
    /// Install failed after the update was applied.
    UpdateInstall {
        step: Step,
        old_head: String,
        old: VersionState,
        new: VersionState,
    },
    /// Rebase of a temporary copy of `source_branch` onto `target_branch`.
    Integrate {
        step: Step,
        source_branch: String,
        target_branch: String,
        temp_branch: String,
    },
}

impl Breakpoint {
    pub fn step(&self) -> Step {
        match self {
            Breakpoint::FinishUpdate { step, .. }
            | Breakpoint::FinishInstall { step, .. }
            | Breakpoint::MergeIntoBase { step, .. }
            | Breakpoint::Update { step, .. }
            | Breakpoint::UpdateInstall { step, .. }
            | Breakpoint::Integrate { step, .. } => *step,
        }
    }

    pub fn category(&self) -> Category {
        self.step().category()
    }

    /// Branch checked out (or being rebased) while this breakpoint is pending.
    pub fn working_branch<'b>(&'b self, owner: &'b str) -> &'b str {
        match self {
            Breakpoint::MergeIntoBase { base_branch, .. } => base_branch.as_str(),
            Breakpoint::Integrate {
                step,
                target_branch,
                ..
            } if step.phase == Phase::Publish => target_branch.as_str(),
            Breakpoint::Integrate { temp_branch, .. } => temp_branch.as_str(),
            _ => owner,
        }
    }

    /// Saved head of the owner branch, when the variant records one.
    pub fn old_head(&self) -> Option<&str> {
        match self {
            Breakpoint::FinishUpdate { old_head, .. }
            | Breakpoint::FinishInstall { old_head, .. }
            | Breakpoint::MergeIntoBase { old_head, .. }
            | Breakpoint::Update { old_head, .. }
            | Breakpoint::UpdateInstall { old_head, .. } => Some(old_head.as_str()),
            Breakpoint::Integrate { .. } => None,
        }
    }

    /// Key holding the owner's old head, e.g. `oldFeatureHEAD`.
    pub fn old_head_key(step: &Step) -> String {
        format!("old{}HEAD", step.branch_type.capitalized())
    }

    pub fn to_entries(&self) -> Vec<(String, String)> {
        let step = self.step();
        let mut entries = vec![(BREAKPOINT.to_string(), step.id())];
        let mut put = |key: &str, value: &str| entries.push((key.to_string(), value.to_string()));
        let head_key = Self::old_head_key(&step);

        match self {
            Breakpoint::FinishUpdate { old_head, .. } | Breakpoint::FinishInstall { old_head, .. } => {
                put(&head_key, old_head);
            }
            Breakpoint::MergeIntoBase {
                base_branch,
                old_base_head,
                old_head,
                ..
            } => {
                put(&head_key, old_head);
                put(MERGE_TARGET_BRANCH, base_branch);
                put(OLD_MERGE_TARGET_HEAD, old_base_head);
            }
            Breakpoint::Update { old_head, old, .. } => {
                put(&head_key, old_head);
                put_version(&mut put, OLD_BASE_VERSION, OLD_VERSION_CHANGE_COMMIT, old);
            }
            Breakpoint::UpdateInstall {
                old_head, old, new, ..
            } => {
                put(&head_key, old_head);
                put_version(&mut put, OLD_BASE_VERSION, OLD_VERSION_CHANGE_COMMIT, old);
                put_version(&mut put, NEW_BASE_VERSION, NEW_VERSION_CHANGE_COMMIT, new);
            }
            Breakpoint::Integrate {
                source_branch,
                target_branch,
                temp_branch,
                ..
            } => {
                put(SOURCE_FEATURE_BRANCH, source_branch);
                put(TARGET_FEATURE_BRANCH, target_branch);
                put(TEMP_BRANCH, temp_branch);
            }
        }
        entries
    }

    /// Rebuild a breakpoint of `owner` from its stored keys.
    pub fn from_entries(owner: &str, get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let id = get(BREAKPOINT).ok_or_else(|| corrupted(owner, "has no breakpoint id"))?;
        let step = Step::parse(&id)
            .ok_or_else(|| corrupted(owner, &format!("has an unknown breakpoint '{id}'")))?;
        let require = |key: &str| {
            get(key).ok_or_else(|| corrupted(owner, &format!("breakpoint '{id}' misses '{key}'")))
        };
        let head_key = Self::old_head_key(&step);
        let version = |base_key: &str, commit_key: &str| VersionState {
            base_version: get(base_key),
            version_change_commit: get(commit_key),
        };

        Ok(match (step.operation, step.phase) {
            (Operation::Finish, Phase::RebaseBeforeFinish | Phase::MergeBeforeFinish) => {
                Breakpoint::FinishUpdate {
                    step,
                    old_head: require(&head_key)?,
                }
            }
            (Operation::Finish, Phase::CleanInstall) => Breakpoint::FinishInstall {
                step,
                old_head: require(&head_key)?,
            },
            (Operation::Finish, Phase::MergeIntoBase | Phase::Publish) => Breakpoint::MergeIntoBase {
                step,
                base_branch: require(MERGE_TARGET_BRANCH)?,
                old_base_head: require(OLD_MERGE_TARGET_HEAD)?,
                old_head: require(&head_key)?,
            },
            (Operation::Rebase | Operation::Update, Phase::Rebase | Phase::Merge) => {
                Breakpoint::Update {
                    step,
                    old_head: require(&head_key)?,
                    old: version(OLD_BASE_VERSION, OLD_VERSION_CHANGE_COMMIT),
                }
            }
            (Operation::Rebase | Operation::Update, Phase::CleanInstall | Phase::Publish) => {
                Breakpoint::UpdateInstall {
                    step,
                    old_head: require(&head_key)?,
                    old: version(OLD_BASE_VERSION, OLD_VERSION_CHANGE_COMMIT),
                    new: version(NEW_BASE_VERSION, NEW_VERSION_CHANGE_COMMIT),
                }
            }
            (Operation::Integrate, Phase::Rebase | Phase::Publish) => Breakpoint::Integrate {
                step,
                source_branch: require(SOURCE_FEATURE_BRANCH)?,
                target_branch: require(TARGET_FEATURE_BRANCH)?,
                temp_branch: require(TEMP_BRANCH)?,
            },
            _ => return Err(corrupted(owner, &format!("has an unsupported breakpoint '{id}'")).into()),
        })
    }
}

fn put_version(
    put: &mut impl FnMut(&str, &str),
    base_key: &str,
    commit_key: &str,
    state: &VersionState,
) {
    if let Some(base) = &state.base_version {
        put(base_key, base);
    }
    if let Some(commit) = &state.version_change_commit {
        put(commit_key, commit);
    }
}

fn corrupted(owner: &str, what: &str) -> FlowError {
    FlowError::corrupted(format!("Branch '{owner}' {what}."))
}
