//! Shared fixtures: a working repository cloned from a bare remote

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

use gitflow::commands::{self, FlowContext};
use gitflow::config::{FlowConfig, UserProperties};
use gitflow::error::flow_error;
use gitflow::git::Git;
use gitflow::models::Goal;
use gitflow::project;
use gitflow::prompt::BatchPrompter;

pub const PROJECT: &str = "version = \"1.0.0-SNAPSHOT\"\n";

/// Run git in `dir`, panicking on failure, and return trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Run git in `dir` and only report whether it succeeded.
pub fn git_ok(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn configure_user(dir: &Path) {
    git(dir, &["config", "user.email", "test@test.com"]);
    git(dir, &["config", "user.name", "Test User"]);
}

/// Working repository on `master` with `project.toml` and `file1.txt`,
/// pushed to a bare `origin`.
pub struct Sandbox {
    pub work: TempDir,
    pub remote: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let remote = TempDir::new().expect("Failed to create remote directory");
        git(remote.path(), &["init", "--bare", "-q"]);

        let work = TempDir::new().expect("Failed to create work directory");
        let root = work.path();
        git(root, &["init", "-q"]);
        configure_user(root);
        fs::write(root.join("project.toml"), PROJECT).expect("Failed to write project.toml");
        fs::write(root.join("file1.txt"), "content1\n").expect("Failed to write file1.txt");
        git(root, &["add", "."]);
        git(root, &["commit", "-q", "-m", "Initial commit"]);
        git(root, &["branch", "-M", "master"]);

        let remote_path = remote.path().to_string_lossy().to_string();
        git(root, &["remote", "add", "origin", &remote_path]);
        git(root, &["push", "-q", "-u", "origin", "master"]);

        Self { work, remote }
    }

    pub fn path(&self) -> &Path {
        self.work.path()
    }

    /// Batch context with `-D` properties.
    pub fn context(&self, defines: &[(&str, &str)]) -> FlowContext {
        context_in(self.path(), defines)
    }

    pub fn run(&self, goal: Goal, defines: &[(&str, &str)]) -> anyhow::Result<()> {
        let mut ctx = self.context(defines);
        commands::execute(goal, &mut ctx)
    }

    /// Like [`Sandbox::run`] with settings a `-D` property cannot reach.
    pub fn run_with(&self, config: &FlowConfig, goal: Goal, defines: &[(&str, &str)]) -> anyhow::Result<()> {
        let mut ctx = context_with(self.path(), config.clone(), defines);
        commands::execute(goal, &mut ctx)
    }

    /// Tip of `branch` in the bare remote.
    pub fn remote_tip(&self, branch: &str) -> String {
        git(self.remote.path(), &["rev-parse", &format!("refs/heads/{branch}")])
    }

    /// Point `origin` somewhere unreachable until [`Sandbox::reconnect`].
    pub fn disconnect(&self) {
        self.git(&["remote", "set-url", "origin", "/nonexistent"]);
    }

    pub fn reconnect(&self) {
        let remote_path = self.remote.path().to_string_lossy().to_string();
        self.git(&["remote", "set-url", "origin", &remote_path]);
    }

    pub fn git(&self, args: &[&str]) -> String {
        git(self.path(), args)
    }

    pub fn commit(&self, file: &str, content: &str, message: &str) -> String {
        fs::write(self.path().join(file), content).expect("Failed to write file");
        self.git(&["add", file]);
        self.git(&["commit", "-q", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn has_branch(&self, name: &str) -> bool {
        git_ok(self.path(), &["rev-parse", "--verify", "-q", &format!("refs/heads/{name}")])
    }

    pub fn remote_has_branch(&self, name: &str) -> bool {
        git_ok(self.remote.path(), &["rev-parse", "--verify", "-q", &format!("refs/heads/{name}")])
    }

    pub fn version(&self) -> String {
        self.context(&[]).project_version().expect("Failed to read version")
    }

    pub fn breakpoint(&self, branch: &str) -> Option<String> {
        let key = format!("branch.{branch}.breakpoint");
        let output = Command::new("git")
            .args(["config", "--local", "--get", &key])
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Second clone of the remote, used to play another developer.
    pub fn other_clone(&self) -> TempDir {
        let dir = TempDir::new().expect("Failed to create clone directory");
        let remote_path = self.remote.path().to_string_lossy().to_string();
        git(dir.path(), &["clone", "-q", &remote_path, "."]);
        configure_user(dir.path());
        dir
    }
}

/// Batch context on the repository at `dir`.
pub fn context_in(dir: &Path, defines: &[(&str, &str)]) -> FlowContext {
    context_with(dir, FlowConfig::default(), defines)
}

pub fn context_with(dir: &Path, config: FlowConfig, defines: &[(&str, &str)]) -> FlowContext {
    let project = project::open(&config.build, dir);
    FlowContext::new(
        Git::new(dir, "origin"),
        config,
        UserProperties::from_pairs(defines.iter().copied()),
        true,
        Box::new(BatchPrompter),
        project,
    )
    .expect("Failed to create context")
}

/// Problem line of the failure banner attached to `err`.
pub fn problem(err: &anyhow::Error) -> String {
    flow_error(err)
        .and_then(|e| e.failure_message())
        .map(|m| m.problem().to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Suggested solution of the failure banner attached to `err`.
pub fn solution(err: &anyhow::Error) -> Option<String> {
    flow_error(err)
        .and_then(|e| e.failure_message())
        .and_then(|m| m.solution_text().map(String::from))
}
