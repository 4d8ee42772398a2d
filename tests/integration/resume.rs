//! Goals re-run on their own interrupted operation
//!
//! Each test stops a goal half-way the way a user would hit it (a failing
//! install, a conflict, an unreachable remote), repairs the cause and runs
//! the goal again.

use serial_test::serial;
use std::fs;

use gitflow::config::FlowConfig;
use gitflow::models::Goal;

use super::helpers::*;

/// Settings whose install only passes once `installable` is committed.
fn installing() -> FlowConfig {
    let mut config = FlowConfig::default();
    config.workflow.install_project = true;
    config.build.install_command = Some("test -f installable".to_string());
    config
}

/// Two features changing `file1.txt` differently; `feature/GBLD-22` is
/// checked out.
fn diverging_features(sandbox: &Sandbox) {
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-21")]).unwrap();
    sandbox.commit("file1.txt", "target\n", "GBLD-21: target change");
    sandbox.git(&["checkout", "-q", "master"]);
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-22")]).unwrap();
    sandbox.commit("file1.txt", "source\n", "GBLD-22: source change");
}

fn integrate(sandbox: &Sandbox) -> anyhow::Result<()> {
    sandbox.run(Goal::FeatureIntegrate, &[("targetFeatureBranch", "feature/GBLD-21")])
}

#[test]
#[serial]
fn test_finish_install_failure_resumes_after_fix() {
    let sandbox = Sandbox::new();
    let config = installing();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-41")]).unwrap();
    sandbox.commit("work.txt", "work\n", "GBLD-41: work");
    let master = sandbox.remote_tip("master");

    let err = sandbox.run_with(&config, Goal::FeatureFinish, &[]).unwrap_err();
    assert!(problem(&err).contains("Installation of branch 'feature/GBLD-41' failed"));
    assert_eq!(
        sandbox.breakpoint("feature/GBLD-41").as_deref(),
        Some("featureFinish.cleanInstall")
    );
    assert_eq!(sandbox.git(&["rev-parse", "master"]), master);

    sandbox.commit("installable", "", "GBLD-41: fix the build");
    sandbox.run_with(&config, Goal::FeatureFinish, &[]).unwrap();

    assert_eq!(sandbox.current_branch(), "master");
    assert_eq!(sandbox.breakpoint("feature/GBLD-41"), None);
    assert_eq!(sandbox.remote_tip("master"), sandbox.git(&["rev-parse", "master"]));
    assert!(sandbox.path().join("installable").exists());
    assert!(!sandbox.remote_has_branch("feature/GBLD-41"));
    assert_eq!(sandbox.version(), "1.0.0-SNAPSHOT");
}

#[test]
#[serial]
fn test_update_install_failure_resumes_after_fix() {
    let sandbox = Sandbox::new();
    let config = installing();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-42")]).unwrap();
    sandbox.commit("work.txt", "work\n", "GBLD-42: work");
    sandbox.git(&["checkout", "-q", "master"]);
    sandbox.commit("other.txt", "other\n", "other work");
    sandbox.git(&["push", "-q", "origin", "master"]);
    sandbox.git(&["checkout", "-q", "feature/GBLD-42"]);
    let pushed = sandbox.remote_tip("feature/GBLD-42");

    assert!(sandbox.run_with(&config, Goal::FeatureRebase, &[]).is_err());
    assert_eq!(
        sandbox.breakpoint("feature/GBLD-42").as_deref(),
        Some("featureRebase.cleanInstall")
    );
    assert_eq!(sandbox.remote_tip("feature/GBLD-42"), pushed);

    sandbox.commit("installable", "", "GBLD-42: fix the build");
    sandbox.run_with(&config, Goal::FeatureRebase, &[]).unwrap();

    assert_eq!(sandbox.breakpoint("feature/GBLD-42"), None);
    assert!(git_ok(sandbox.path(), &["merge-base", "--is-ancestor", "master", "feature/GBLD-42"]));
    assert_eq!(
        sandbox.remote_tip("feature/GBLD-42"),
        sandbox.git(&["rev-parse", "feature/GBLD-42"])
    );
    assert_eq!(sandbox.version(), "1.0.0-GBLD-42-SNAPSHOT");
}

#[test]
#[serial]
fn test_release_merge_conflict_resumes_with_staged_resolution() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::ReleaseStart, &[]).unwrap();
    sandbox.commit("file1.txt", "release\n", "NO-ISSUE: release fix");
    sandbox.git(&["checkout", "-q", "master"]);
    sandbox.commit("file1.txt", "master\n", "master change");
    sandbox.git(&["push", "-q", "origin", "master"]);
    sandbox.git(&["checkout", "-q", "release/1.0.0"]);

    let err = sandbox.run(Goal::ReleaseFinish, &[]).unwrap_err();
    assert!(problem(&err).starts_with("Automatic merge failed on branch 'master'"));
    assert_eq!(
        sandbox.breakpoint("release/1.0.0").as_deref(),
        Some("releaseFinish.mergeIntoBase")
    );

    // Still unresolved: the goal keeps the breakpoint.
    assert!(sandbox.run(Goal::ReleaseFinish, &[]).is_err());
    assert!(sandbox.path().join(".git/MERGE_HEAD").exists());

    fs::write(sandbox.path().join("file1.txt"), "resolved\n").unwrap();
    sandbox.git(&["add", "file1.txt"]);
    sandbox.run(Goal::ReleaseFinish, &[]).unwrap();

    assert_eq!(sandbox.current_branch(), "master");
    assert_eq!(sandbox.breakpoint("release/1.0.0"), None);
    assert_eq!(sandbox.git(&["show", "v1.0.0:file1.txt"]), "resolved");
    assert_eq!(sandbox.version(), "1.0.1-SNAPSHOT");
    assert!(git_ok(sandbox.remote.path(), &["rev-parse", "--verify", "-q", "refs/tags/v1.0.0"]));
    assert!(!sandbox.has_branch("release/1.0.0"));
    assert!(!sandbox.remote_has_branch("release/1.0.0"));
}

#[test]
#[serial]
fn test_hotfix_merge_conflict_resumes_after_manual_commit() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::HotfixStart, &[("hotfixVersion", "1.0.1")]).unwrap();
    sandbox.commit("file1.txt", "hotfix\n", "GBLD-43: fix");
    sandbox.git(&["checkout", "-q", "master"]);
    sandbox.commit("file1.txt", "master\n", "master change");
    sandbox.git(&["push", "-q", "origin", "master"]);
    sandbox.git(&["checkout", "-q", "hotfix/1.0.1"]);

    assert!(sandbox.run(Goal::HotfixFinish, &[]).is_err());
    assert_eq!(
        sandbox.breakpoint("hotfix/1.0.1").as_deref(),
        Some("hotfixFinish.mergeIntoBase")
    );

    fs::write(sandbox.path().join("file1.txt"), "hotfix\n").unwrap();
    sandbox.git(&["add", "file1.txt"]);
    sandbox.git(&["commit", "-q", "--no-edit"]);
    sandbox.run(Goal::HotfixFinish, &[]).unwrap();

    assert_eq!(sandbox.breakpoint("hotfix/1.0.1"), None);
    assert!(git_ok(sandbox.path(), &["rev-parse", "--verify", "-q", "refs/tags/v1.0.1"]));
    assert_eq!(sandbox.remote_tip("master"), sandbox.git(&["rev-parse", "master"]));
    assert!(!sandbox.has_branch("hotfix/1.0.1"));
}

#[test]
#[serial]
fn test_integrate_conflict_resumes_after_resolution() {
    let sandbox = Sandbox::new();
    diverging_features(&sandbox);

    let err = integrate(&sandbox).unwrap_err();
    assert!(problem(&err).starts_with("Automatic rebase failed on branch 'tmp-feature/GBLD-22'"));
    assert_eq!(
        sandbox.breakpoint("feature/GBLD-22").as_deref(),
        Some("featureIntegrate.rebase")
    );
    assert!(sandbox.has_branch("tmp-feature/GBLD-22"));

    fs::write(sandbox.path().join("file1.txt"), "both\n").unwrap();
    sandbox.git(&["add", "file1.txt"]);
    integrate(&sandbox).unwrap();

    assert_eq!(sandbox.current_branch(), "feature/GBLD-21");
    assert_eq!(fs::read_to_string(sandbox.path().join("file1.txt")).unwrap(), "both\n");
    assert_eq!(sandbox.version(), "1.0.0-GBLD-21-SNAPSHOT");
    assert_eq!(sandbox.breakpoint("feature/GBLD-22"), None);
    assert!(!sandbox.has_branch("tmp-feature/GBLD-22"));
    assert!(!sandbox.has_branch("feature/GBLD-22"));
    assert!(!sandbox.remote_has_branch("feature/GBLD-22"));
    assert_eq!(
        sandbox.remote_tip("feature/GBLD-21"),
        sandbox.git(&["rev-parse", "feature/GBLD-21"])
    );
}

#[test]
#[serial]
fn test_integrate_conflict_abort_restores_source() {
    let sandbox = Sandbox::new();
    diverging_features(&sandbox);
    let source = sandbox.git(&["rev-parse", "feature/GBLD-22"]);
    let target = sandbox.git(&["rev-parse", "feature/GBLD-21"]);
    assert!(integrate(&sandbox).is_err());

    sandbox.run(Goal::FeatureIntegrateAbort, &[]).unwrap();

    assert_eq!(sandbox.current_branch(), "feature/GBLD-22");
    assert!(!sandbox.path().join(".git/rebase-merge").exists());
    assert!(!sandbox.has_branch("tmp-feature/GBLD-22"));
    assert_eq!(sandbox.breakpoint("feature/GBLD-22"), None);
    assert_eq!(sandbox.git(&["rev-parse", "feature/GBLD-22"]), source);
    assert_eq!(sandbox.git(&["rev-parse", "feature/GBLD-21"]), target);
}

#[test]
#[serial]
fn test_feature_abort_during_integrate_drops_temp_branch() {
    let sandbox = Sandbox::new();
    diverging_features(&sandbox);
    assert!(integrate(&sandbox).is_err());

    sandbox.run(Goal::FeatureAbort, &[]).unwrap();

    assert_eq!(sandbox.current_branch(), "master");
    assert!(!sandbox.path().join(".git/rebase-merge").exists());
    assert!(!sandbox.has_branch("tmp-feature/GBLD-22"));
    assert!(!sandbox.has_branch("feature/GBLD-22"));
    assert_eq!(sandbox.breakpoint("feature/GBLD-22"), None);
    assert!(sandbox.has_branch("feature/GBLD-21"));
}

#[test]
#[serial]
fn test_feature_abort_from_elsewhere_unwinds_integrate() {
    let sandbox = Sandbox::new();
    diverging_features(&sandbox);
    assert!(integrate(&sandbox).is_err());

    // The user gave up on the rebase by hand and left.
    sandbox.git(&["rebase", "--abort"]);
    sandbox.git(&["checkout", "-q", "master"]);
    assert!(sandbox.has_branch("tmp-feature/GBLD-22"));

    sandbox
        .run(Goal::FeatureAbort, &[("featureBranch", "feature/GBLD-22")])
        .unwrap();

    assert!(!sandbox.has_branch("tmp-feature/GBLD-22"));
    assert!(!sandbox.has_branch("feature/GBLD-22"));
    assert_eq!(sandbox.breakpoint("feature/GBLD-22"), None);
}

#[test]
#[serial]
fn test_finish_push_failure_keeps_breakpoint_until_published() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-44")]).unwrap();
    sandbox.commit("work.txt", "work\n", "GBLD-44: work");
    let master = sandbox.remote_tip("master");

    sandbox.disconnect();
    let err = sandbox
        .run(Goal::FeatureFinish, &[("flow.fetch", "false")])
        .unwrap_err();
    assert!(problem(&err).starts_with("Publishing the result of featureFinish.publish failed"));
    assert_eq!(
        sandbox.breakpoint("feature/GBLD-44").as_deref(),
        Some("featureFinish.publish")
    );
    assert_eq!(sandbox.current_branch(), "master");
    assert!(sandbox.path().join("work.txt").exists());
    assert!(sandbox.has_branch("feature/GBLD-44"));

    sandbox.reconnect();
    assert_eq!(sandbox.remote_tip("master"), master);
    sandbox.run(Goal::FeatureFinish, &[]).unwrap();

    assert_eq!(sandbox.breakpoint("feature/GBLD-44"), None);
    assert_eq!(sandbox.remote_tip("master"), sandbox.git(&["rev-parse", "master"]));
    assert!(!sandbox.has_branch("feature/GBLD-44"));
    assert!(!sandbox.remote_has_branch("feature/GBLD-44"));
    assert!(sandbox.context(&[]).central().get("feature/GBLD-44").unwrap().is_empty());
    assert_eq!(
        sandbox.remote_tip("branch-config"),
        sandbox.git(&["rev-parse", "branch-config"])
    );
}

#[test]
#[serial]
fn test_rebase_push_failure_is_retried() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-45")]).unwrap();
    sandbox.commit("work.txt", "work\n", "GBLD-45: work");
    sandbox.git(&["checkout", "-q", "master"]);
    sandbox.commit("other.txt", "other\n", "other work");
    sandbox.git(&["push", "-q", "origin", "master"]);
    sandbox.git(&["checkout", "-q", "feature/GBLD-45"]);

    sandbox.disconnect();
    assert!(sandbox.run(Goal::FeatureRebase, &[("flow.fetch", "false")]).is_err());
    assert_eq!(
        sandbox.breakpoint("feature/GBLD-45").as_deref(),
        Some("featureRebase.publish")
    );

    sandbox.reconnect();
    sandbox.run(Goal::FeatureRebase, &[]).unwrap();

    assert_eq!(sandbox.breakpoint("feature/GBLD-45"), None);
    assert_eq!(
        sandbox.remote_tip("feature/GBLD-45"),
        sandbox.git(&["rev-parse", "feature/GBLD-45"])
    );
    assert_eq!(
        sandbox.remote_tip("branch-config"),
        sandbox.git(&["rev-parse", "branch-config"])
    );
}

#[test]
#[serial]
fn test_goal_on_named_branch_respects_its_breakpoint() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-21")]).unwrap();
    sandbox.commit("work.txt", "work\n", "GBLD-21: work");
    assert!(sandbox.run_with(&installing(), Goal::FeatureFinish, &[]).is_err());
    assert_eq!(
        sandbox.breakpoint("feature/GBLD-21").as_deref(),
        Some("featureFinish.cleanInstall")
    );
    let head = sandbox.git(&["rev-parse", "feature/GBLD-21"]);

    sandbox.git(&["checkout", "-q", "master"]);
    sandbox.commit("other.txt", "other\n", "other work");
    sandbox.git(&["push", "-q", "origin", "master"]);

    let err = sandbox
        .run(Goal::FeatureRebase, &[("featureBranch", "feature/GBLD-21")])
        .unwrap_err();
    assert_eq!(
        solution(&err).as_deref(),
        Some("Finish this interrupted operation or abort it first.")
    );
    assert_eq!(
        sandbox.breakpoint("feature/GBLD-21").as_deref(),
        Some("featureFinish.cleanInstall")
    );
    assert_eq!(sandbox.git(&["rev-parse", "feature/GBLD-21"]), head);

    let err = sandbox
        .run(Goal::FeatureResetToRemote, &[("featureBranch", "feature/GBLD-21")])
        .unwrap_err();
    assert!(problem(&err).contains("featureFinish.cleanInstall"));
}
