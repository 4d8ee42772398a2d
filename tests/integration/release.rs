//! release and hotfix lifecycles

use serial_test::serial;

use gitflow::models::Goal;

use super::helpers::*;

#[test]
#[serial]
fn test_release_start_and_finish() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::ReleaseStart, &[]).unwrap();
    assert_eq!(sandbox.current_branch(), "release/1.0.0");
    assert_eq!(sandbox.version(), "1.0.0");

    sandbox.run(Goal::ReleaseFinish, &[]).unwrap();

    assert_eq!(sandbox.current_branch(), "master");
    assert_eq!(sandbox.version(), "1.0.1-SNAPSHOT");
    assert_eq!(
        sandbox.git(&["show", "v1.0.0:project.toml"]),
        "version = \"1.0.0\""
    );
    assert!(git_ok(sandbox.remote.path(), &["rev-parse", "--verify", "-q", "refs/tags/v1.0.0"]));
    assert!(!sandbox.has_branch("release/1.0.0"));
    assert!(!sandbox.remote_has_branch("release/1.0.0"));
    assert_eq!(
        sandbox.git(&["log", "-1", "--format=%s"]),
        "NO-ISSUE: updating for next development version"
    );
}

#[test]
#[serial]
fn test_hotfix_with_explicit_versions() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::HotfixStart, &[("hotfixVersion", "1.0.5")]).unwrap();
    assert_eq!(sandbox.current_branch(), "hotfix/1.0.5");
    sandbox.commit("fix.txt", "fix\n", "GBLD-77: fix");

    sandbox
        .run(Goal::HotfixFinish, &[("developmentVersion", "1.1.0-SNAPSHOT")])
        .unwrap();

    assert_eq!(sandbox.version(), "1.1.0-SNAPSHOT");
    assert!(sandbox.path().join("fix.txt").exists());
    assert!(git_ok(sandbox.path(), &["rev-parse", "--verify", "-q", "refs/tags/v1.0.5"]));
}

#[test]
#[serial]
fn test_release_finish_refuses_existing_tag() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::ReleaseStart, &[]).unwrap();
    sandbox.git(&["tag", "v1.0.0", "master"]);

    let err = sandbox.run(Goal::ReleaseFinish, &[]).unwrap_err();
    assert_eq!(problem(&err), "Tag 'v1.0.0' already exists.");
    assert!(sandbox.has_branch("release/1.0.0"));
    assert_eq!(sandbox.breakpoint("release/1.0.0"), None);
}
