//! reset-to-remote after someone else rewrote the branch

use serial_test::serial;
use std::fs;

use gitflow::models::Goal;

use super::helpers::*;

/// feature/GBLD-60 rewritten on the remote by another clone.
fn rewritten_feature(sandbox: &Sandbox) -> (tempfile::TempDir, String) {
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-60")]).unwrap();

    let other = sandbox.other_clone();
    git(other.path(), &["checkout", "-q", "feature/GBLD-60"]);
    fs::write(other.path().join("theirs.txt"), "theirs\n").unwrap();
    git(other.path(), &["add", "theirs.txt"]);
    git(other.path(), &["commit", "-q", "--amend", "-m", "GBLD-60: rewritten"]);
    git(other.path(), &["push", "-q", "-f", "origin", "feature/GBLD-60"]);
    let theirs = git(other.path(), &["rev-parse", "HEAD"]);
    (other, theirs)
}

#[test]
#[serial]
fn test_diverged_branch_needs_confirmation() {
    let sandbox = Sandbox::new();
    let (_other, theirs) = rewritten_feature(&sandbox);
    let mine = sandbox.commit("mine.txt", "mine\n", "GBLD-60: mine");

    sandbox.run(Goal::FeatureResetToRemote, &[]).unwrap();
    assert_eq!(sandbox.git(&["rev-parse", "HEAD"]), mine);

    sandbox
        .run(Goal::FeatureResetToRemote, &[("discardLocalCommits", "true")])
        .unwrap();
    assert_eq!(sandbox.current_branch(), "feature/GBLD-60");
    assert_eq!(sandbox.git(&["rev-parse", "HEAD"]), theirs);
    assert!(sandbox.path().join("theirs.txt").exists());
    assert!(!sandbox.path().join("mine.txt").exists());
}

#[test]
#[serial]
fn test_remote_ahead_fast_forwards() {
    let sandbox = Sandbox::new();
    sandbox.run(Goal::FeatureStart, &[("featureName", "GBLD-61")]).unwrap();

    let other = sandbox.other_clone();
    git(other.path(), &["checkout", "-q", "feature/GBLD-61"]);
    fs::write(other.path().join("more.txt"), "more\n").unwrap();
    git(other.path(), &["add", "more.txt"]);
    git(other.path(), &["commit", "-q", "-m", "GBLD-61: more"]);
    git(other.path(), &["push", "-q", "origin", "feature/GBLD-61"]);

    sandbox.run(Goal::FeatureResetToRemote, &[]).unwrap();
    assert_eq!(
        sandbox.git(&["rev-parse", "HEAD"]),
        git(other.path(), &["rev-parse", "HEAD"])
    );
}

#[test]
#[serial]
fn test_dirty_tree_aborts_by_default() {
    let sandbox = Sandbox::new();
    let (_other, _) = rewritten_feature(&sandbox);
    let head = sandbox.git(&["rev-parse", "HEAD"]);
    fs::write(sandbox.path().join("file1.txt"), "dirty\n").unwrap();

    sandbox
        .run(Goal::FeatureResetToRemote, &[("discardLocalCommits", "true")])
        .unwrap();
    assert_eq!(sandbox.git(&["rev-parse", "HEAD"]), head);
    assert_eq!(
        fs::read_to_string(sandbox.path().join("file1.txt")).unwrap(),
        "dirty\n"
    );
}

#[test]
#[serial]
fn test_remote_only_branch_is_checked_out() {
    let sandbox = Sandbox::new();
    let other = sandbox.other_clone();
    let mut ctx = context_in(other.path(), &[("featureName", "GBLD-62")]);
    gitflow::commands::execute(Goal::FeatureStart, &mut ctx).unwrap();

    sandbox
        .run(Goal::FeatureResetToRemote, &[("featureBranch", "feature/GBLD-62")])
        .unwrap();
    assert_eq!(sandbox.current_branch(), "feature/GBLD-62");
    assert_eq!(
        sandbox.git(&["rev-parse", "HEAD"]),
        git(other.path(), &["rev-parse", "HEAD"])
    );
    assert_eq!(sandbox.version(), "1.0.0-GBLD-62-SNAPSHOT");
}
