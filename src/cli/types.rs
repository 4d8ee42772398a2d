use clap::Parser;
use gitflow::config::parse_define;
use gitflow::models::Goal;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}";

#[derive(Parser)]
#[command(name = "gitflow")]
#[command(about = "Gitflow branch lifecycle with resumable operations", long_about = None)]
#[command(version)]
#[command(help_template = HELP_TEMPLATE)]
pub struct Cli {
    /// Goal to run, e.g. feature-start or epic-update-abort
    #[arg(value_enum)]
    pub goal: Goal,

    /// Never prompt; missing parameters fail instead
    #[arg(short = 'B', long = "batch-mode")]
    pub batch_mode: bool,

    /// Parameter or switch as key=value (repeatable)
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, String)>,

    /// Repository directory (defaults to the current directory)
    #[arg(short = 'C', long = "directory")]
    pub directory: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
