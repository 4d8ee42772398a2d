//! Git command runner abstraction
//!
//! Provides centralized functions for running git commands with consistent
//! error handling. Non-zero exits of checked commands become
//! [`FlowError::ToolFailed`] carrying the raw stderr.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

use crate::error::FlowError;

/// Run a git command and return the raw Output.
///
/// Use this when you need access to both stdout and stderr, or when a
/// non-zero exit is an expected result (conflicts, missing config keys).
pub fn run_git(args: &[&str], repo_root: &Path) -> Result<Output> {
    run_git_with_env(args, &[], repo_root)
}

/// Run a git command with extra environment variables.
pub fn run_git_with_env(args: &[&str], env: &[(&str, &str)], repo_root: &Path) -> Result<Output> {
    debug!(command = %args.join(" "), "git");
    Command::new("git")
        .args(args)
        .envs(env.iter().copied())
        .current_dir(repo_root)
        .output()
        .with_context(|| format!("Failed to execute: git {}", args.join(" ")))
}

/// Run a git command, check for success, and return stdout as a trimmed String.
pub fn run_git_checked(args: &[&str], repo_root: &Path) -> Result<String> {
    run_git_checked_with_env(args, &[], repo_root)
}

pub fn run_git_checked_with_env(
    args: &[&str],
    env: &[(&str, &str)],
    repo_root: &Path,
) -> Result<String> {
    let output = run_git_with_env(args, env, repo_root)?;
    check_output(args, &output)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run a git command and return true if exit code is 0.
///
/// Silently swallows errors (both spawn failures and non-zero exits).
/// Use this for status checks like `rev-parse --verify`.
pub fn run_git_bool(args: &[&str], repo_root: &Path) -> bool {
    run_git(args, repo_root)
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Turn a failed git invocation into a tooling failure.
pub fn check_output(args: &[&str], output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(tool_failed(args, output).into())
}

pub fn tool_failed(args: &[&str], output: &Output) -> FlowError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stderr = if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    };
    FlowError::ToolFailed {
        tool: "git".to_string(),
        command: format!("git {}", args.join(" ")),
        stderr,
    }
}

pub fn stdout_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
