use eval_tracker_core::{
    BlobSpec, CoreError, ResultTable, Result, RunConfig, RunFilter, RunInit, RunLocator,
    RunOutcome, RunSession, RunStore, TaskMetricMap, TaskResults, BATCH_SIZE_KEY, COMMIT_ID_KEY,
    LEADERBOARD_TABLE_NAME, TARGET_MODEL_KEY,
};
use eval_tracker_metrics::{AverageCalculator, ScoreAggregator};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::blobs::plan_blobs;

/// Parameters of a fresh upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshUpload {
    pub target_model: String,
    pub commit_id: String,
    pub batch_size: u32,
    /// Harness wall-clock time in seconds.
    pub elapsed_time: i64,
}

/// Parameters of an amendment to an existing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amendment {
    pub target_model: String,
    /// Seconds added to the stored `Elapsed Time`.
    pub elapsed_time_delta: Option<i64>,
    /// Task columns to drop from the average, in addition to those already
    /// recorded on the run.
    pub exclude_tasks: Vec<String>,
}

impl Amendment {
    pub fn new(target_model: impl Into<String>) -> Self {
        Self {
            target_model: target_model.into(),
            elapsed_time_delta: None,
            exclude_tasks: Vec::new(),
        }
    }

    pub fn with_elapsed_time(mut self, delta: i64) -> Self {
        self.elapsed_time_delta = Some(delta);
        self
    }

    pub fn with_exclusions(mut self, tasks: Vec<String>) -> Self {
        self.exclude_tasks = tasks;
        self
    }
}

/// What a successful create or amend left on the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishSummary {
    pub run_id: String,
    pub table_name: String,
    pub table: ResultTable,
    pub blobs: Vec<BlobSpec>,
    pub excluded_tasks: Vec<String>,
}

/// Publishes leaderboard tables and result blobs to a [`RunStore`].
///
/// All local work (scoring, table edits, average, blob directories) is done
/// before a session is opened, so a configuration error never leaves a
/// half-written run behind. Amending is a plain read-modify-write: two
/// writers amending the same run concurrently lose one update.
pub struct RunTableWriter<S> {
    store: S,
    locator: RunLocator,
    table_name: String,
    metric_map: TaskMetricMap,
}

impl<S: RunStore> RunTableWriter<S> {
    pub fn new(store: S, locator: RunLocator) -> Self {
        Self {
            store,
            locator,
            table_name: LEADERBOARD_TABLE_NAME.to_string(),
            metric_map: TaskMetricMap::open_llm_leaderboard(),
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_metric_map(mut self, metric_map: TaskMetricMap) -> Self {
        self.metric_map = metric_map;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn locator(&self) -> &RunLocator {
        &self.locator
    }

    /// Open a new run for `upload.target_model` and publish its first table.
    pub async fn create(&self, tasks: &TaskResults, upload: &FreshUpload) -> Result<PublishSummary> {
        if tasks.is_empty() {
            return Err(CoreError::NoResults);
        }

        let scores = ScoreAggregator::new(&self.metric_map).score_all(tasks)?;
        let mut table = ResultTable::fresh(&upload.target_model, &scores, upload.elapsed_time);
        let average = AverageCalculator::row_average(&table, &[])?;
        table.set_average(average)?;

        let blobs = plan_blobs(tasks, &upload.target_model)?;

        let config = RunConfig::new()
            .with(COMMIT_ID_KEY, upload.commit_id.as_str())
            .with(TARGET_MODEL_KEY, upload.target_model.as_str())
            .with(BATCH_SIZE_KEY, upload.batch_size);
        let init = RunInit::create(config).with_name(upload.target_model.as_str());

        info!(
            model = %upload.target_model,
            tasks = tasks.len(),
            "Creating run in {}",
            self.locator
        );
        let run_id = self.publish(init, &table, &blobs).await?;

        Ok(PublishSummary {
            run_id,
            table_name: self.table_name.clone(),
            table,
            blobs,
            excluded_tasks: Vec::new(),
        })
    }

    /// Append `tasks` to the run of `amendment.target_model`, bump its
    /// elapsed time, and recompute the average.
    ///
    /// `tasks` may be empty, which only recomputes the average (for example
    /// after adding exclusions).
    pub async fn amend(&self, tasks: &TaskResults, amendment: &Amendment) -> Result<PublishSummary> {
        let scores = ScoreAggregator::new(&self.metric_map).score_all(tasks)?;
        let blobs = plan_blobs(tasks, &amendment.target_model)?;

        let filter = RunFilter::target_model(amendment.target_model.as_str());
        let run = self.store.find_run(&self.locator, &filter).await?;
        info!(run_id = %run.id, "Found run for {}", amendment.target_model);

        let mut table = self
            .store
            .fetch_latest_table(&self.locator, &run.id, &self.table_name)
            .await?;
        table.ensure_leaderboard_shape()?;

        if let Some(delta) = amendment.elapsed_time_delta {
            table.add_elapsed_time(delta)?;
        }
        for (task, score) in &scores {
            table.add_score_column(task, *score)?;
        }

        let mut excluded = run.config.excluded_tasks();
        for task in &amendment.exclude_tasks {
            if !excluded.contains(task) {
                excluded.push(task.clone());
            }
        }
        let average = AverageCalculator::row_average(&table, &excluded)?;
        table.set_average(average)?;

        let mut config = run.config.clone();
        if !amendment.exclude_tasks.is_empty() {
            config.set_excluded_tasks(&excluded);
        }

        let run_id = self
            .publish(RunInit::resume(run.id.as_str(), config), &table, &blobs)
            .await?;

        Ok(PublishSummary {
            run_id,
            table_name: self.table_name.clone(),
            table,
            blobs,
            excluded_tasks: excluded,
        })
    }

    /// Recompute the average of an existing run with extra columns left out.
    pub async fn exclude(&self, target_model: &str, exclude_tasks: Vec<String>) -> Result<PublishSummary> {
        let amendment = Amendment::new(target_model).with_exclusions(exclude_tasks);
        self.amend(&TaskResults::new(), &amendment).await
    }

    /// Open a session, write the table and blobs, and finish the session on
    /// every path. A failure to finish never hides an earlier error.
    async fn publish(&self, init: RunInit, table: &ResultTable, blobs: &[BlobSpec]) -> Result<String> {
        let mut session = self.store.open_run(&self.locator, init).await?;
        let run_id = session.run_id().to_string();

        let written = write_session(session.as_mut(), &self.table_name, table, blobs).await;
        let outcome = if written.is_ok() {
            RunOutcome::Succeeded
        } else {
            RunOutcome::Failed
        };
        let finished = session.finish(outcome).await;

        match (written, finished) {
            (Ok(()), Ok(())) => {
                info!(run_id = %run_id, "Published {}", self.table_name);
                Ok(run_id)
            }
            (Ok(()), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(finish_error)) => {
                warn!(run_id = %run_id, error = %finish_error, "Failed to finish run");
                Err(e)
            }
        }
    }
}

async fn write_session(
    session: &mut dyn RunSession,
    table_name: &str,
    table: &ResultTable,
    blobs: &[BlobSpec],
) -> Result<()> {
    session.publish_table(table_name, table).await?;
    for blob in blobs {
        info!(
            name = %blob.name,
            kind = %blob.kind,
            "Uploading {}",
            blob.source_dir.display()
        );
        session.upload_blob(blob).await?;
    }
    Ok(())
}
