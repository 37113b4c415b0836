use eval_tracker_core::{
    write_out_dir, CoreError, Result, TaskResult, TaskResults, VariantMetrics, WRITE_OUT_ROOT,
};
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Python-style non-finite literals the harness emits, longest first so
/// `-Infinity` is not read as `-` followed by `Infinity`.
const NON_FINITE_TOKENS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Loads harness result files from one directory.
#[derive(Debug, Clone)]
pub struct ResultLoader {
    result_dir: PathBuf,
    target_model: String,
    tasks: Option<Vec<String>>,
    write_out: bool,
    write_out_root: PathBuf,
}

impl ResultLoader {
    /// Loader in full-evaluation mode: every `*.json` under `result_dir`.
    pub fn new(result_dir: impl Into<PathBuf>, target_model: impl Into<String>) -> Self {
        Self {
            result_dir: result_dir.into(),
            target_model: target_model.into(),
            tasks: None,
            write_out: false,
            write_out_root: PathBuf::from(WRITE_OUT_ROOT),
        }
    }

    /// Load exactly `{result_dir}/{task}.json` for each listed task.
    pub fn with_tasks(mut self, tasks: Vec<String>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Record the write-out directory of every loaded task.
    pub fn with_write_out(mut self, enabled: bool) -> Self {
        self.write_out = enabled;
        self
    }

    pub fn with_write_out_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.write_out_root = root.into();
        self
    }

    pub fn load(&self) -> Result<TaskResults> {
        if !self.result_dir.is_dir() {
            return Err(CoreError::ResultDirNotFound(self.result_dir.clone()));
        }

        let files = match &self.tasks {
            Some(tasks) => self.listed_files(tasks)?,
            None => self.discover_files()?,
        };

        let mut results = TaskResults::new();
        for (task_name, path) in files {
            let mut task = load_result_file(&task_name, &path)?;
            if self.write_out {
                task = task.with_write_out_dir(write_out_dir(
                    &self.write_out_root,
                    &self.target_model,
                    &task_name,
                ));
            }
            results.insert(task_name, task);
        }

        info!(
            "Loaded {} task result(s) from {}",
            results.len(),
            self.result_dir.display()
        );
        Ok(results)
    }

    fn listed_files(&self, tasks: &[String]) -> Result<Vec<(String, PathBuf)>> {
        tasks
            .iter()
            .map(|task| {
                let path = self.result_dir.join(format!("{}.json", task));
                if path.is_file() {
                    Ok((task.clone(), path))
                } else {
                    Err(CoreError::ResultFileNotFound(path))
                }
            })
            .collect()
    }

    fn discover_files(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.result_dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                files.push((stem.to_string(), path.clone()));
            }
        }
        files.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
        debug!(count = files.len(), "Discovered result files");
        Ok(files)
    }
}

/// Parse one harness result file into a [`TaskResult`].
pub fn load_result_file(task_name: &str, path: &Path) -> Result<TaskResult> {
    let malformed = |reason: String| CoreError::MalformedResult {
        path: path.to_path_buf(),
        reason,
    };

    let text = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&normalize_non_finite(&text))
        .map_err(|e| malformed(e.to_string()))?;

    let results = document
        .get("results")
        .ok_or_else(|| malformed("missing `results` field".to_string()))?;
    let config = document
        .get("config")
        .ok_or_else(|| malformed("missing `config` field".to_string()))?;

    let variants = results
        .as_object()
        .ok_or_else(|| malformed("`results` is not an object".to_string()))?;

    let mut metrics = IndexMap::with_capacity(variants.len());
    for (variant, values) in variants {
        let values = values
            .as_object()
            .ok_or_else(|| malformed(format!("variant {} is not an object", variant)))?;
        metrics.insert(variant.clone(), variant_metrics(values));
    }

    Ok(TaskResult::new(task_name, metrics, path, config.clone()))
}

/// Numeric metrics of one variant. `null` (a normalised NaN) becomes NaN;
/// strings such as `alias` are dropped.
fn variant_metrics(values: &serde_json::Map<String, Value>) -> VariantMetrics {
    values
        .iter()
        .filter_map(|(name, value)| match value {
            Value::Null => Some((name.clone(), f64::NAN)),
            other => other.as_f64().map(|v| (name.clone(), v)),
        })
        .collect()
}

/// Replace `NaN`, `Infinity` and `-Infinity` outside string literals with
/// `null` so the document parses as JSON.
pub fn normalize_non_finite(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = NON_FINITE_TOKENS.iter().find(|t| rest.starts_with(*t)) {
            out.push_str("null");
            rest = &rest[token.len()..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}
