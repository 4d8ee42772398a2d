//! Lifecycle and operation aborts

use serial_test::serial;
use std::fs;

use gitflow::breakpoint::{Breakpoint, Operation, Phase, Step};
use gitflow::models::{BranchType, Goal};

use super::helpers::*;

/// feature/GBLD-1 with a commit that conflicts with master.
fn conflicting_feature(sandbox: &Sandbox) {
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-1")]).unwrap();
    sandbox.commit("file1.txt", "feature\n", "GBLD-1: change");
    sandbox.git(&["checkout", "-q", "master"]);
    sandbox.commit("file1.txt", "master\n", "master change");
    sandbox.git(&["push", "-q", "origin", "master"]);
    sandbox.git(&["checkout", "-q", "feature/GBLD-1"]);
}

#[test]
#[serial]
fn test_abort_is_idempotent() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-3")]).unwrap();
    assert!(sandbox.remote_has_branch("feature/GBLD-3"));

    sandbox.run(Goal::FeatureAbort, &[]).unwrap();
    assert_eq!(sandbox.current_branch(), "master");
    assert!(!sandbox.has_branch("feature/GBLD-3"));
    assert!(!sandbox.remote_has_branch("feature/GBLD-3"));
    assert!(sandbox.context(&[]).central().get("feature/GBLD-3").unwrap().is_empty());

    let master = sandbox.git(&["rev-parse", "master"]);
    let err = sandbox.run(Goal::FeatureAbort, &[]).unwrap_err();
    assert!(problem(&err).contains("nothing to abort"));
    assert_eq!(sandbox.git(&["rev-parse", "master"]), master);
}

#[test]
#[serial]
fn test_abort_declined_keeps_branch() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-4")]).unwrap();

    sandbox.run(Goal::FeatureAbort, &[("confirmAbort", "false")]).unwrap();
    assert!(sandbox.has_branch("feature/GBLD-4"));
}

#[test]
#[serial]
fn test_abort_unwinds_interrupted_finish() {
    let sandbox = Sandbox::new();
    conflicting_feature(&sandbox);
    assert!(sandbox.run(Goal::FeatureFinish, &[]).is_err());

    sandbox.run(Goal::FeatureAbort, &[]).unwrap();

    assert_eq!(sandbox.current_branch(), "master");
    assert!(!sandbox.path().join(".git/rebase-merge").exists());
    assert_eq!(sandbox.breakpoint("feature/GBLD-1"), None);
    assert!(!sandbox.has_branch("feature/GBLD-1"));
    assert_eq!(
        fs::read_to_string(sandbox.path().join("file1.txt")).unwrap(),
        "master\n"
    );
}

#[test]
#[serial]
fn test_rebase_abort_restores_branch() {
    let sandbox = Sandbox::new();
    conflicting_feature(&sandbox);
    let before = sandbox.git(&["rev-parse", "HEAD"]);

    assert!(sandbox.run(Goal::FeatureRebase, &[]).is_err());
    assert_eq!(sandbox.breakpoint("feature/GBLD-1").as_deref(), Some("featureRebase.rebase"));

    // A finish does not match a rebase breakpoint.
    assert!(sandbox.run(Goal::FeatureFinish, &[]).is_err());
    assert_eq!(sandbox.breakpoint("feature/GBLD-1").as_deref(), Some("featureRebase.rebase"));

    sandbox.run(Goal::FeatureRebaseAbort, &[]).unwrap();
    assert_eq!(sandbox.current_branch(), "feature/GBLD-1");
    assert_eq!(sandbox.git(&["rev-parse", "HEAD"]), before);
    assert_eq!(sandbox.breakpoint("feature/GBLD-1"), None);

    let err = sandbox.run(Goal::FeatureRebaseAbort, &[]).unwrap_err();
    assert!(problem(&err).contains("nothing to abort"));
    assert_eq!(sandbox.git(&["rev-parse", "HEAD"]), before);
}

#[test]
#[serial]
fn test_integrate_abort_leaves_foreign_rebase_alone() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-8")]).unwrap();
    sandbox.git(&["checkout", "-q", "master"]);

    // A rebase the user started by hand on an unrelated branch.
    sandbox.git(&["checkout", "-q", "-b", "topic"]);
    sandbox.commit("file1.txt", "topic\n", "topic change");
    sandbox.git(&["checkout", "-q", "master"]);
    sandbox.commit("file1.txt", "other\n", "other change");
    assert!(!git_ok(sandbox.path(), &["rebase", "master", "topic"]));

    let ctx = sandbox.context(&[]);
    let breakpoint = Breakpoint::Integrate {
        step: Step::new(BranchType::Feature, Operation::Integrate, Phase::Rebase),
        source_branch: "feature/GBLD-8".to_string(),
        target_branch: "feature/GBLD-9".to_string(),
        temp_branch: "tmp-feature/GBLD-8".to_string(),
    };
    ctx.breakpoints().save("feature/GBLD-8", &breakpoint).unwrap();

    let err = sandbox.run(Goal::FeatureIntegrateAbort, &[]).unwrap_err();
    assert!(problem(&err).contains("does not belong to the interrupted operation"));
    assert!(sandbox.path().join(".git/rebase-merge").exists());
    assert_eq!(
        sandbox.breakpoint("feature/GBLD-8").as_deref(),
        Some("featureIntegrate.rebase")
    );
}
