use std::collections::HashMap;

use crate::error::{CoreError, Result};

/// Canonical scoring metric per task, as used by the Open LLM Leaderboard.
pub const OPEN_LLM_LEADERBOARD_METRICS: &[(&str, &str)] = &[
    ("arc-challenge", "acc_norm"),
    ("hellaswag", "acc_norm"),
    ("truthfulqa-mc", "mc2"),
    ("mmlu", "acc"),
    ("winogrande", "acc"),
    ("gsm8k", "acc"),
    ("drop", "f1"),
];

/// Fixed task -> canonical metric lookup. Built once at startup and never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskMetricMap {
    metrics: HashMap<String, String>,
}

impl TaskMetricMap {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            metrics: pairs
                .into_iter()
                .map(|(task, metric)| (task.to_string(), metric.to_string()))
                .collect(),
        }
    }

    pub fn open_llm_leaderboard() -> Self {
        Self::from_pairs(OPEN_LLM_LEADERBOARD_METRICS.iter().copied())
    }

    pub fn metric_for(&self, task_name: &str) -> Result<&str> {
        self.metrics
            .get(task_name)
            .map(String::as_str)
            .ok_or_else(|| CoreError::UnknownTask(task_name.to_string()))
    }

    pub fn contains(&self, task_name: &str) -> bool {
        self.metrics.contains_key(task_name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl Default for TaskMetricMap {
    fn default() -> Self {
        Self::open_llm_leaderboard()
    }
}
