//! Central branch config shared through the remote

use serial_test::serial;

use gitflow::commands;
use gitflow::models::Goal;

use super::helpers::*;

#[test]
#[serial]
fn test_entries_visible_from_other_clone() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-50")]).unwrap();

    let other = sandbox.other_clone();
    let ctx = context_in(other.path(), &[]);
    let entry = ctx.central().get("feature/GBLD-50").unwrap();
    assert_eq!(entry.base_branch(), Some("master"));
    assert_eq!(entry.issue_number(), Some("GBLD-50"));
    assert_eq!(ctx.central().list().unwrap(), vec!["feature/GBLD-50".to_string()]);

    // The work tree of the clone never sees the config branch.
    assert!(!other.path().join("feature%2FGBLD-50").exists());
}

#[test]
#[serial]
fn test_branch_config_goal_reaches_remote() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-51")]).unwrap();

    sandbox
        .run(
            Goal::BranchConfig,
            &[("propertyName", "reviewer"), ("propertyValue", "ann")],
        )
        .unwrap();

    let other = sandbox.other_clone();
    let entry = context_in(other.path(), &[]).central().get("feature/GBLD-51").unwrap();
    assert_eq!(entry.get("reviewer"), Some("ann"));

    // Removing it from the clone is seen back in the first repository.
    let mut ctx = context_in(
        other.path(),
        &[
            ("branchName", "feature/GBLD-51"),
            ("propertyName", "reviewer"),
            ("propertyValue", ""),
        ],
    );
    commands::execute(Goal::BranchConfig, &mut ctx).unwrap();

    sandbox.git(&["fetch", "-q", "origin"]);
    let entry = sandbox.context(&[]).central().get("feature/GBLD-51").unwrap();
    assert_eq!(entry.get("reviewer"), None);
    assert_eq!(entry.issue_number(), Some("GBLD-51"));
}

#[test]
#[serial]
fn test_upgrade_keeps_central_values() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-52")]).unwrap();
    sandbox.git(&["config", "branch.feature/GBLD-52.baseBranch", "develop"]);
    sandbox.git(&["config", "branch.feature/GBLD-52.baseVersion", "0.9.0-SNAPSHOT"]);
    sandbox.git(&["config", "branch.feature/GBLD-7.issueNumber", "GBLD-7"]);

    sandbox.run(Goal::Upgrade, &[]).unwrap();

    let ctx = sandbox.context(&[]);
    let entry = ctx.central().get("feature/GBLD-52").unwrap();
    assert_eq!(entry.base_branch(), Some("master"));
    assert_eq!(entry.base_version(), Some("1.0.0-SNAPSHOT"));
    assert_eq!(
        ctx.central().get("feature/GBLD-7").unwrap().issue_number(),
        Some("GBLD-7")
    );
    assert!(!git_ok(
        sandbox.path(),
        &["config", "--get", "branch.feature/GBLD-52.baseBranch"]
    ));
    // Tracking config is not ours to move.
    assert_eq!(sandbox.git(&["config", "--get", "branch.master.remote"]), "origin");
}
