//! epic-update and feature-rebase against a remote

use serial_test::serial;
use std::fs;

use gitflow::models::Goal;

use super::helpers::*;

/// Bump the version on master and push it.
fn bump_master(sandbox: &Sandbox, branch: &str) {
    sandbox.git(&["checkout", "-q", "master"]);
    sandbox.commit("project.toml", "version = \"1.1.0-SNAPSHOT\"\n", "bump");
    sandbox.git(&["push", "-q", "origin", "master"]);
    sandbox.git(&["checkout", "-q", branch]);
}

#[test]
#[serial]
fn test_epic_update_merges_base() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::EpicStart, &[("epicName", "GBLD-30")]).unwrap();
    sandbox.commit("epic.txt", "epic\n", "GBLD-30: epic work");
    let before = sandbox.git(&["rev-parse", "HEAD"]);
    bump_master(&sandbox, "epic/GBLD-30");

    sandbox.run(Goal::EpicUpdate, &[]).unwrap();

    assert_eq!(sandbox.version(), "1.1.0-GBLD-30-SNAPSHOT");
    assert_eq!(
        sandbox.git(&["log", "-1", "--format=%s", "HEAD~1"]),
        "GBLD-30: Merge branch master into epic/GBLD-30"
    );
    // Merging keeps the old history.
    assert!(git_ok(sandbox.path(), &["merge-base", "--is-ancestor", &before, "HEAD"]));
    assert_eq!(
        sandbox.git(&["rev-parse", "HEAD"]),
        git(sandbox.remote.path(), &["rev-parse", "epic/GBLD-30"])
    );

    let entry = sandbox.context(&[]).central().get("epic/GBLD-30").unwrap();
    assert_eq!(entry.base_version(), Some("1.1.0-SNAPSHOT"));
    assert_eq!(
        entry.version_change_commit(),
        Some(sandbox.git(&["rev-parse", "HEAD"]).as_str())
    );
    assert_eq!(sandbox.breakpoint("epic/GBLD-30"), None);
}

#[test]
#[serial]
fn test_feature_rebase_rewrites_remote() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-31")]).unwrap();
    sandbox.commit("work.txt", "work\n", "GBLD-31: work");
    sandbox.git(&["push", "-q", "origin", "feature/GBLD-31"]);
    bump_master(&sandbox, "feature/GBLD-31");

    sandbox.run(Goal::FeatureRebase, &[]).unwrap();

    assert_eq!(sandbox.version(), "1.1.0-GBLD-31-SNAPSHOT");
    assert_eq!(
        sandbox.git(&["rev-list", "--count", "master..HEAD"]),
        "2"
    );
    assert_eq!(
        sandbox.git(&["log", "-1", "--format=%s", "HEAD~1"]),
        "GBLD-31: work"
    );
    assert_eq!(
        sandbox.git(&["rev-parse", "HEAD"]),
        git(sandbox.remote.path(), &["rev-parse", "feature/GBLD-31"])
    );
    assert_eq!(
        fs::read_to_string(sandbox.path().join("work.txt")).unwrap(),
        "work\n"
    );
}
