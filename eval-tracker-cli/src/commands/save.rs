//! Fresh upload of a full evaluation

use anyhow::{Context as _, Result};
use clap::Args;
use eval_tracker_workflow::{FreshUpload, ResultLoader};
use tracing::info;

use super::{publish, warn_missing_write_out, ResultArgs, TrackerArgs};
use crate::context::Context;

/// Create a run holding the leaderboard table of a full evaluation
#[derive(Debug, Args)]
pub struct SaveArgs {
    #[command(flatten)]
    pub results: ResultArgs,

    /// Evaluated model, e.g. `org/model`
    #[arg(long = "target_model")]
    pub target_model: String,

    /// Batch size used for the evaluation
    #[arg(long = "batch_size")]
    pub batch_size: u32,

    /// lm-evaluation-harness commit id
    #[arg(long = "commit_id")]
    pub commit_id: String,

    /// Harness wall-clock time in seconds
    #[arg(long = "elapsed_time", allow_negative_numbers = true)]
    pub elapsed_time: i64,

    #[command(flatten)]
    pub tracker: TrackerArgs,
}

pub async fn execute(ctx: &Context, args: SaveArgs) -> Result<()> {
    let tasks = ResultLoader::new(&args.results.result_dir, &args.target_model)
        .with_write_out(args.results.is_write_out)
        .with_write_out_root(&args.results.write_out_dir)
        .load()
        .with_context(|| {
            format!(
                "Failed to load results from {}",
                args.results.result_dir.display()
            )
        })?;
    info!("Loaded {} tasks for {}", tasks.len(), args.target_model);
    warn_missing_write_out(ctx, &tasks);

    let writer = ctx.create_writer(&args.tracker.entity, &args.tracker.project)?;
    let upload = FreshUpload {
        target_model: args.target_model,
        commit_id: args.commit_id,
        batch_size: args.batch_size,
        elapsed_time: args.elapsed_time,
    };

    publish(ctx, "Uploading results...", writer.create(&tasks, &upload)).await
}
