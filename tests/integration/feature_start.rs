//! feature-start and epic-start against a remote

use serial_test::serial;

use gitflow::models::Goal;

use super::helpers::*;

#[test]
#[serial]
fn test_feature_start_gbld_42() {
    let sandbox = Sandbox::new();
    sandbox
        .run(Goal::FeatureStart, &[("featureName", "GBLD-42")])
        .unwrap();

    assert_eq!(sandbox.current_branch(), "feature/GBLD-42");
    assert_eq!(sandbox.version(), "1.0.0-GBLD-42-SNAPSHOT");
    assert!(sandbox.remote_has_branch("feature/GBLD-42"));
    assert!(sandbox.remote_has_branch("branch-config"));

    let entry = sandbox.context(&[]).central().get("feature/GBLD-42").unwrap();
    assert_eq!(entry.base_branch(), Some("master"));
    assert_eq!(entry.base_version(), Some("1.0.0-SNAPSHOT"));
    assert_eq!(entry.issue_number(), Some("GBLD-42"));
    assert_eq!(
        entry.version_change_commit(),
        Some(sandbox.git(&["rev-parse", "HEAD"]).as_str())
    );
}

#[test]
#[serial]
fn test_start_refuses_base_behind_remote() {
    let sandbox = Sandbox::new();
    let other = other_clone_with_commit(&sandbox);

    let err = sandbox
        .run(Goal::FeatureStart, &[("featureName", "GBLD-1")])
        .unwrap_err();
    assert!(problem(&err).contains("is ahead of local 'master'"));
    assert!(!sandbox.has_branch("feature/GBLD-1"));
    assert_eq!(sandbox.current_branch(), "master");
    drop(other);
}

#[test]
#[serial]
fn test_start_from_integration_branch() {
    let sandbox = Sandbox::new();
    let integrated = sandbox.git(&["rev-parse", "HEAD"]);
    sandbox.git(&["branch", "integration/master", &integrated]);
    sandbox.commit("untested.txt", "x\n", "not integrated");
    sandbox.git(&["push", "-q", "origin", "master"]);

    sandbox
        .run(Goal::FeatureStart, &[("featureName", "GBLD-2")])
        .unwrap();
    assert!(!sandbox.path().join("untested.txt").exists());

    sandbox.git(&["checkout", "-q", "master"]);
    sandbox
        .run(
            Goal::FeatureStart,
            &[("featureName", "GBLD-3"), ("startFromIntegration", "false")],
        )
        .unwrap();
    assert!(sandbox.path().join("untested.txt").exists());
}

#[test]
#[serial]
fn test_epic_and_feature_on_epic() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::EpicStart, &[("epicName", "GBLD-10")]).unwrap();
    sandbox
        .run(Goal::FeatureStart, &[("featureName", "GBLD-11")])
        .unwrap();

    let entry = sandbox.context(&[]).central().get("feature/GBLD-11").unwrap();
    assert_eq!(entry.base_branch(), Some("epic/GBLD-10"));
    assert_eq!(sandbox.version(), "1.0.0-GBLD-11-SNAPSHOT");
}

fn other_clone_with_commit(sandbox: &Sandbox) -> tempfile::TempDir {
    let other = sandbox.other_clone();
    std::fs::write(other.path().join("remote.txt"), "remote\n").unwrap();
    git(other.path(), &["add", "remote.txt"]);
    git(other.path(), &["commit", "-q", "-m", "remote work"]);
    git(other.path(), &["push", "-q", "origin", "master"]);
    other
}
