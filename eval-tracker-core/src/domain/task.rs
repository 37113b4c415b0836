use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root directory the harness writes per-task debug output into.
pub const WRITE_OUT_ROOT: &str = "write_out";

/// Metric values of one scored configuration (few-shot setting, subset, ...).
pub type VariantMetrics = IndexMap<String, f64>;

/// Loaded results keyed by task name, in load order.
pub type TaskResults = IndexMap<String, TaskResult>;

/// One harness result file, loaded and immutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskResult {
    pub task_name: String,
    /// variant id -> metric name -> value. A metric the harness wrote as
    /// NaN or null is stored as `f64::NAN`.
    pub metrics: IndexMap<String, VariantMetrics>,
    pub result_file: PathBuf,
    pub write_out_dir: Option<PathBuf>,
    /// Harness configuration, passed through untouched.
    pub config: serde_json::Value,
}

impl TaskResult {
    pub fn new(
        task_name: impl Into<String>,
        metrics: IndexMap<String, VariantMetrics>,
        result_file: impl Into<PathBuf>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            metrics,
            result_file: result_file.into(),
            write_out_dir: None,
            config,
        }
    }

    pub fn with_write_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.write_out_dir = Some(dir.into());
        self
    }

    /// Directory holding the result file; `.` when the path has no parent.
    pub fn result_dir(&self) -> &Path {
        match self.result_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// `{root}/{model}/{task}`, normally under [`WRITE_OUT_ROOT`]. Slashes in
/// the model id are kept, so `org/model` nests one level deeper.
pub fn write_out_dir(root: &Path, target_model: &str, task_name: &str) -> PathBuf {
    root.join(target_model).join(task_name)
}
