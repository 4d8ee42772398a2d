//! The goals exposed on the command line

use clap::ValueEnum;
use std::fmt;

use super::branch::BranchType;

/// One verb per lifecycle action plus the utility goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Goal {
    FeatureStart,
    FeatureFinish,
    FeatureAbort,
    FeatureRebase,
    FeatureRebaseAbort,
    FeatureIntegrate,
    FeatureIntegrateAbort,
    FeatureResetToRemote,
    EpicStart,
    EpicFinish,
    EpicAbort,
    EpicUpdate,
    EpicUpdateAbort,
    EpicResetToRemote,
    ReleaseStart,
    ReleaseFinish,
    ReleaseAbort,
    HotfixStart,
    HotfixFinish,
    HotfixAbort,
    MaintenanceStart,
    BranchConfig,
    SetVersion,
    BuildVersion,
    Integrated,
    Upgrade,
}

impl Goal {
    /// Branch type a lifecycle goal operates on.
    pub fn branch_type(&self) -> Option<BranchType> {
        use Goal::*;
        match self {
            FeatureStart | FeatureFinish | FeatureAbort | FeatureRebase | FeatureRebaseAbort
            | FeatureIntegrate | FeatureIntegrateAbort | FeatureResetToRemote => {
                Some(BranchType::Feature)
            }
            EpicStart | EpicFinish | EpicAbort | EpicUpdate | EpicUpdateAbort
            | EpicResetToRemote => Some(BranchType::Epic),
            ReleaseStart | ReleaseFinish | ReleaseAbort => Some(BranchType::Release),
            HotfixStart | HotfixFinish | HotfixAbort => Some(BranchType::Hotfix),
            MaintenanceStart => Some(BranchType::Maintenance),
            BranchConfig | SetVersion | BuildVersion | Integrated | Upgrade => None,
        }
    }

    /// Command-line name, e.g. `feature-rebase-abort`.
    pub fn name(&self) -> String {
        self.to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_default()
    }

    pub fn start_for(branch_type: BranchType) -> Option<Goal> {
        match branch_type {
            BranchType::Feature => Some(Goal::FeatureStart),
            BranchType::Epic => Some(Goal::EpicStart),
            BranchType::Release => Some(Goal::ReleaseStart),
            BranchType::Hotfix => Some(Goal::HotfixStart),
            BranchType::Maintenance => Some(Goal::MaintenanceStart),
            BranchType::Support | BranchType::Integration => None,
        }
    }

    pub fn finish_for(branch_type: BranchType) -> Option<Goal> {
        match branch_type {
            BranchType::Feature => Some(Goal::FeatureFinish),
            BranchType::Epic => Some(Goal::EpicFinish),
            BranchType::Release => Some(Goal::ReleaseFinish),
            BranchType::Hotfix => Some(Goal::HotfixFinish),
            _ => None,
        }
    }

    pub fn abort_for(branch_type: BranchType) -> Option<Goal> {
        match branch_type {
            BranchType::Feature => Some(Goal::FeatureAbort),
            BranchType::Epic => Some(Goal::EpicAbort),
            BranchType::Release => Some(Goal::ReleaseAbort),
            BranchType::Hotfix => Some(Goal::HotfixAbort),
            _ => None,
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
