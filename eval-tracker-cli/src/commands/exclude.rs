//! Average-only correction

use anyhow::Result;
use clap::Args;

use super::{publish, TrackerArgs};
use crate::context::Context;

/// Recompute the Average of the model's run without the given columns.
/// The columns and their scores stay in the table.
#[derive(Debug, Args)]
pub struct ExcludeArgs {
    /// Evaluated model, e.g. `org/model`
    #[arg(long = "target_model")]
    pub target_model: String,

    /// Task columns to drop from the Average
    #[arg(long = "exclude_tasks", num_args = 1.., required = true)]
    pub exclude_tasks: Vec<String>,

    #[command(flatten)]
    pub tracker: TrackerArgs,
}

pub async fn execute(ctx: &Context, args: ExcludeArgs) -> Result<()> {
    let writer = ctx.create_writer(&args.tracker.entity, &args.tracker.project)?;
    publish(
        ctx,
        "Recomputing Average...",
        writer.exclude(&args.target_model, args.exclude_tasks),
    )
    .await
}
