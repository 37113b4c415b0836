use eval_tracker_core::{CoreError, Result, TaskMetricMap, TaskResult, TaskResults};
use indexmap::IndexMap;
use tracing::warn;

/// Reduces a task's per-variant metrics to one score using the canonical
/// metric of the task.
#[derive(Debug, Clone, Copy)]
pub struct ScoreAggregator<'a> {
    metric_map: &'a TaskMetricMap,
}

impl<'a> ScoreAggregator<'a> {
    pub fn new(metric_map: &'a TaskMetricMap) -> Self {
        Self { metric_map }
    }

    /// Mean of the canonical metric over every variant of `task`.
    ///
    /// A NaN value is reported and kept, so one NaN variant makes the task
    /// score NaN.
    pub fn task_score(&self, task: &TaskResult) -> Result<f64> {
        let metric = self.metric_map.metric_for(&task.task_name)?;

        if task.metrics.is_empty() {
            return Err(CoreError::NoVariants(task.task_name.clone()));
        }

        let mut sum = 0.0;
        for (variant, values) in &task.metrics {
            let value = values
                .get(metric)
                .copied()
                .ok_or_else(|| CoreError::MissingMetric {
                    task: task.task_name.clone(),
                    variant: variant.clone(),
                    metric: metric.to_string(),
                })?;

            if value.is_nan() {
                warn!(
                    task = %task.task_name,
                    metric = %metric,
                    variant = %variant,
                    "Metric value is NaN"
                );
            }
            sum += value;
        }

        Ok(sum / task.metrics.len() as f64)
    }

    /// Score every task, keeping the input order.
    pub fn score_all(&self, tasks: &TaskResults) -> Result<IndexMap<String, f64>> {
        tasks
            .iter()
            .map(|(name, task)| Ok((name.clone(), self.task_score(task)?)))
            .collect()
    }
}
