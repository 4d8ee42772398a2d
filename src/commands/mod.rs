pub mod abort;
pub mod common;
pub mod finish;
pub mod integrate;
pub mod reset;
pub mod resume;
pub mod start;
pub mod update;
pub mod utility;

use anyhow::{bail, Result};

pub use common::FlowContext;

use crate::models::{BranchType, Goal};

/// Run one goal against a prepared context.
pub fn execute(goal: Goal, ctx: &mut FlowContext) -> Result<()> {
    use Goal::*;

    let lifecycle_type = || match goal.branch_type() {
        Some(branch_type) => Ok(branch_type),
        None => bail!("'{goal}' is not a branch goal"),
    };

    match goal {
        FeatureStart | EpicStart | ReleaseStart | HotfixStart | MaintenanceStart => {
            start::start(ctx, lifecycle_type()?)
        }
        FeatureFinish | EpicFinish | ReleaseFinish | HotfixFinish => {
            finish::finish(ctx, lifecycle_type()?)
        }
        FeatureAbort | EpicAbort | ReleaseAbort | HotfixAbort => {
            abort::abort(ctx, lifecycle_type()?)
        }
        FeatureRebase => update::update(ctx, BranchType::Feature),
        EpicUpdate => update::update(ctx, BranchType::Epic),
        FeatureRebaseAbort | EpicUpdateAbort | FeatureIntegrateAbort => {
            abort::abort_operation(ctx, goal)
        }
        FeatureIntegrate => integrate::integrate(ctx),
        FeatureResetToRemote | EpicResetToRemote => {
            reset::reset_to_remote(ctx, lifecycle_type()?)
        }
        BranchConfig => utility::branch_config(ctx),
        SetVersion => utility::set_version(ctx),
        BuildVersion => utility::build_version(ctx),
        Integrated => utility::integrated(ctx),
        Upgrade => utility::upgrade(ctx),
    }
}
