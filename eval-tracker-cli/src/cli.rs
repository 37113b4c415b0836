//! Command-line arguments

use clap::{Parser, Subcommand};

use crate::commands::{amend::AmendArgs, exclude::ExcludeArgs, save::SaveArgs};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "eval-tracker")]
#[command(author, version, about = "Upload lm-evaluation-harness results to the experiment tracker")]
#[command(long_about = "Upload lm-evaluation-harness results to the experiment tracker.\n\n\
    `save` creates a run with the leaderboard table, `amend` adds newly evaluated tasks \
    to an existing run, and `exclude` drops task columns from the run's Average.")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration profile to use
    #[arg(short, long, global = true, env = "EVAL_TRACKER_PROFILE")]
    pub profile: Option<String>,

    /// Tracker API URL (overrides the profile)
    #[arg(long, global = true, env = "EVAL_TRACKER_API_URL")]
    pub api_url: Option<String>,

    /// API key (overrides the profile)
    #[arg(long, global = true, env = "EVAL_TRACKER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a run for a full evaluation
    Save(SaveArgs),

    /// Add newly evaluated tasks to the model's existing run
    #[command(alias = "add")]
    Amend(AmendArgs),

    /// Drop task columns from the Average of the model's existing run
    Exclude(ExcludeArgs),
}
