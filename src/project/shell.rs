//! Shell invocation for build commands

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

use super::ExecutedCommand;

/// Run `command` through `sh -c` in `working_dir`.
pub fn run_shell(command: &str, working_dir: &Path) -> Result<ExecutedCommand> {
    debug!(command, "running build command");
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to spawn command: {command}"))?;

    let mut text = String::from_utf8_lossy(&output.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(ExecutedCommand {
        command: command.to_string(),
        success: output.status.success(),
        output: text,
    })
}
