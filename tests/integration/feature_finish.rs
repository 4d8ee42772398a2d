//! feature-finish including the interrupted pre-finish rebase

use serial_test::serial;
use std::fs;

use gitflow::models::Goal;

use super::helpers::*;

#[test]
#[serial]
fn test_finish_merges_and_cleans_up() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-5")]).unwrap();
    sandbox.commit("work.txt", "work\n", "GBLD-5: work");

    sandbox.run(Goal::FeatureFinish, &[]).unwrap();

    assert_eq!(sandbox.current_branch(), "master");
    assert_eq!(sandbox.version(), "1.0.0-SNAPSHOT");
    assert!(sandbox.path().join("work.txt").exists());
    assert_eq!(
        sandbox.git(&["log", "-1", "--format=%s"]),
        "GBLD-5: Merge branch feature/GBLD-5"
    );
    assert!(!sandbox.has_branch("feature/GBLD-5"));
    assert!(!sandbox.remote_has_branch("feature/GBLD-5"));
    assert!(sandbox.context(&[]).central().get("feature/GBLD-5").unwrap().is_empty());
    assert_eq!(
        sandbox.git(&["rev-parse", "master"]),
        git(sandbox.remote.path(), &["rev-parse", "master"])
    );
}

#[test]
#[serial]
fn test_finish_without_real_changes() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-6")]).unwrap();

    let err = sandbox.run(Goal::FeatureFinish, &[]).unwrap_err();
    assert_eq!(
        problem(&err),
        "There are no real changes in feature branch 'feature/GBLD-6'."
    );
    assert!(sandbox.has_branch("feature/GBLD-6"));
    assert_eq!(sandbox.breakpoint("feature/GBLD-6"), None);
}

#[test]
#[serial]
fn test_conflicting_rebase_before_finish() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-1")]).unwrap();
    sandbox.commit("file1.txt", "feature\n", "GBLD-1: change");

    sandbox.git(&["checkout", "-q", "master"]);
    sandbox.commit("file1.txt", "master\n", "master change");
    sandbox.git(&["push", "-q", "origin", "master"]);
    sandbox.git(&["checkout", "-q", "feature/GBLD-1"]);

    let err = sandbox.run(Goal::FeatureFinish, &[]).unwrap_err();
    assert!(problem(&err).starts_with("Automatic rebase failed on branch 'feature/GBLD-1'"));
    assert!(problem(&err).contains("file1.txt"));
    assert_eq!(
        sandbox.breakpoint("feature/GBLD-1").as_deref(),
        Some("featureFinish.rebaseBeforeFinish")
    );

    // Any other goal is refused while the finish is interrupted.
    let err = sandbox.run(Goal::EpicStart, &[("epicName", "GBLD-2")]).unwrap_err();
    assert!(problem(&err).contains("An interrupted operation (featureFinish.rebaseBeforeFinish)"));

    // Conflicts still unresolved: nothing moves.
    let err = sandbox.run(Goal::FeatureFinish, &[]).unwrap_err();
    assert!(problem(&err).starts_with("Unresolved conflicts remain on branch 'feature/GBLD-1'"));
    assert!(sandbox.breakpoint("feature/GBLD-1").is_some());

    fs::write(sandbox.path().join("file1.txt"), "resolved\n").unwrap();
    sandbox.git(&["add", "file1.txt"]);
    sandbox.run(Goal::FeatureFinish, &[]).unwrap();

    assert_eq!(sandbox.current_branch(), "master");
    assert_eq!(
        fs::read_to_string(sandbox.path().join("file1.txt")).unwrap(),
        "resolved\n"
    );
    assert_eq!(sandbox.version(), "1.0.0-SNAPSHOT");
    assert_eq!(sandbox.breakpoint("feature/GBLD-1"), None);
    assert!(!sandbox.has_branch("feature/GBLD-1"));
    assert!(sandbox.context(&[]).central().get("feature/GBLD-1").unwrap().is_empty());
}

#[test]
#[serial]
fn test_finish_refuses_dirty_tree() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-7")]).unwrap();
    sandbox.commit("work.txt", "work\n", "GBLD-7: work");
    fs::write(sandbox.path().join("work.txt"), "dirty\n").unwrap();

    let err = sandbox.run(Goal::FeatureFinish, &[]).unwrap_err();
    assert_eq!(problem(&err), "You have some uncommitted files.");
    assert!(sandbox.has_branch("feature/GBLD-7"));
}
