use anyhow::{Context, Result};
use colored::Colorize;
use gitflow::commands::{self, FlowContext};
use gitflow::config::UserProperties;
use gitflow::error::{flow_error, FlowError};
use tracing::debug;

use super::types::Cli;

pub fn dispatch(cli: Cli) -> Result<()> {
    let directory = match cli.directory {
        Some(directory) => directory,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    let properties = UserProperties::from_pairs(cli.defines);
    debug!(goal = %cli.goal, directory = %directory.display(), "running goal");

    let mut ctx = FlowContext::open(&directory, properties, cli.batch_mode)?;
    let result = commands::execute(cli.goal, &mut ctx);
    for executed in ctx.command_log().entries() {
        debug!(command = %executed.command, success = executed.success, "build command");
    }
    result
}

/// Print a failure: the banner for workflow failures, the error chain
/// for everything else.
pub fn report(err: &anyhow::Error) {
    if let Some(
        banner @ (FlowError::Workflow(_) | FlowError::Corrupted(_) | FlowError::MissingParameter { .. }),
    ) = flow_error(err)
    {
        eprintln!("{}", banner.to_string().red());
        return;
    }
    eprintln!("{} {err}", "Error:".red().bold());
    for cause in err.chain().skip(1) {
        eprintln!("  {} {cause}", "caused by:".dimmed());
    }
}
