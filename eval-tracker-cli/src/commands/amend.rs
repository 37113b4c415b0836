//! Incremental upload of newly evaluated tasks

use anyhow::{Context as _, Result};
use clap::Args;
use eval_tracker_workflow::{Amendment, ResultLoader};
use tracing::info;

use super::{publish, warn_missing_write_out, ResultArgs, TrackerArgs};
use crate::context::Context;

/// Append task columns to the model's existing run
#[derive(Debug, Args)]
pub struct AmendArgs {
    #[command(flatten)]
    pub results: ResultArgs,

    /// Evaluated model, e.g. `org/model`
    #[arg(long = "target_model")]
    pub target_model: String,

    /// Seconds the additional evaluation took; added to Elapsed Time
    #[arg(long = "elapsed_time", allow_negative_numbers = true)]
    pub elapsed_time: i64,

    /// Tasks to load from the result directory
    #[arg(long = "tasks", num_args = 1.., required = true)]
    pub tasks: Vec<String>,

    /// Task columns to drop from the Average as well
    #[arg(long = "exclude_tasks", num_args = 1..)]
    pub exclude_tasks: Vec<String>,

    #[command(flatten)]
    pub tracker: TrackerArgs,
}

pub async fn execute(ctx: &Context, args: AmendArgs) -> Result<()> {
    let tasks = ResultLoader::new(&args.results.result_dir, &args.target_model)
        .with_tasks(args.tasks)
        .with_write_out(args.results.is_write_out)
        .with_write_out_root(&args.results.write_out_dir)
        .load()
        .with_context(|| {
            format!(
                "Failed to load results from {}",
                args.results.result_dir.display()
            )
        })?;
    info!("Loaded {} additional tasks for {}", tasks.len(), args.target_model);
    warn_missing_write_out(ctx, &tasks);

    let writer = ctx.create_writer(&args.tracker.entity, &args.tracker.project)?;
    let amendment = Amendment::new(args.target_model)
        .with_elapsed_time(args.elapsed_time)
        .with_exclusions(args.exclude_tasks);

    publish(ctx, "Amending run...", writer.amend(&tasks, &amendment)).await
}
