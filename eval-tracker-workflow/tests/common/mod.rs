#![allow(dead_code)]

use async_trait::async_trait;
use eval_tracker_core::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A run as the in-memory store keeps it.
#[derive(Debug, Clone)]
pub struct StoredRun {
    pub record: RunRecord,
    /// storage key -> every published version, oldest first
    pub tables: HashMap<String, Vec<ResultTable>>,
    pub blobs: Vec<BlobSpec>,
    pub sessions_opened: usize,
    pub finishes: Vec<RunOutcome>,
}

#[derive(Debug, Default)]
struct State {
    runs: Vec<StoredRun>,
    next_id: usize,
    fail_publish: bool,
    fail_finish: bool,
}

/// Versioning run store held in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing run holding one published table.
    pub fn seed_run(&self, id: &str, target_model: &str, table: ResultTable) {
        let mut state = self.state.lock().unwrap();
        let mut tables = HashMap::new();
        tables.insert(table_storage_key(id, LEADERBOARD_TABLE_NAME), vec![table]);
        state.runs.push(StoredRun {
            record: RunRecord {
                id: id.to_string(),
                name: Some(target_model.to_string()),
                config: RunConfig::new().with(TARGET_MODEL_KEY, target_model),
            },
            tables,
            blobs: Vec::new(),
            sessions_opened: 0,
            finishes: Vec::new(),
        });
    }

    pub fn fail_publishes(&self) {
        self.state.lock().unwrap().fail_publish = true;
    }

    pub fn fail_finishes(&self) {
        self.state.lock().unwrap().fail_finish = true;
    }

    pub fn run(&self, id: &str) -> StoredRun {
        self.state
            .lock()
            .unwrap()
            .runs
            .iter()
            .find(|run| run.record.id == id)
            .cloned()
            .unwrap_or_else(|| panic!("no run {}", id))
    }

    pub fn run_count(&self) -> usize {
        self.state.lock().unwrap().runs.len()
    }

    pub fn table_versions(&self, id: &str) -> Vec<ResultTable> {
        self.run(id)
            .tables
            .get(&table_storage_key(id, LEADERBOARD_TABLE_NAME))
            .cloned()
            .unwrap_or_default()
    }

    pub fn sessions_opened(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .runs
            .iter()
            .map(|run| run.sessions_opened)
            .sum()
    }
}

#[async_trait]
impl RunStore for InMemoryStore {
    async fn list_runs(&self, _locator: &RunLocator, filter: &RunFilter) -> Result<Vec<RunRecord>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .runs
            .iter()
            .filter(|run| filter.matches(&run.record.config))
            .map(|run| run.record.clone())
            .collect())
    }

    async fn open_run(&self, _locator: &RunLocator, init: RunInit) -> Result<Box<dyn RunSession>> {
        let mut state = self.state.lock().unwrap();
        let run_id = match init.id {
            Some(id) => {
                let run = state
                    .runs
                    .iter_mut()
                    .find(|run| run.record.id == id)
                    .ok_or_else(|| CoreError::Remote(format!("run {} not found", id)))?;
                run.record.config = init.config;
                run.sessions_opened += 1;
                id
            }
            None => {
                state.next_id += 1;
                let id = format!("run{}", state.next_id);
                state.runs.push(StoredRun {
                    record: RunRecord {
                        id: id.clone(),
                        name: init.name,
                        config: init.config,
                    },
                    tables: HashMap::new(),
                    blobs: Vec::new(),
                    sessions_opened: 1,
                    finishes: Vec::new(),
                });
                id
            }
        };

        Ok(Box::new(InMemorySession {
            store: self.clone(),
            run_id,
        }))
    }

    async fn fetch_latest_table(
        &self,
        _locator: &RunLocator,
        run_id: &str,
        table_name: &str,
    ) -> Result<ResultTable> {
        let key = self.table_storage_key(run_id, table_name);
        self.state
            .lock()
            .unwrap()
            .runs
            .iter()
            .find(|run| run.record.id == run_id)
            .and_then(|run| run.tables.get(&key))
            .and_then(|versions| versions.last())
            .cloned()
            .ok_or_else(|| CoreError::Remote(format!("artifact {}:latest not found", key)))
    }
}

pub struct InMemorySession {
    store: InMemoryStore,
    run_id: String,
}

impl InMemorySession {
    fn with_run<T>(&self, f: impl FnOnce(&mut StoredRun) -> T) -> T {
        let mut state = self.store.state.lock().unwrap();
        let run = state
            .runs
            .iter_mut()
            .find(|run| run.record.id == self.run_id)
            .unwrap();
        f(run)
    }
}

#[async_trait]
impl RunSession for InMemorySession {
    fn run_id(&self) -> &str {
        &self.run_id
    }

    async fn publish_table(&mut self, table_name: &str, table: &ResultTable) -> Result<()> {
        if self.store.state.lock().unwrap().fail_publish {
            return Err(CoreError::Remote("publish rejected".to_string()));
        }
        let key = table_storage_key(&self.run_id, table_name);
        self.with_run(|run| run.tables.entry(key).or_default().push(table.clone()));
        Ok(())
    }

    async fn upload_blob(&mut self, blob: &BlobSpec) -> Result<()> {
        self.with_run(|run| run.blobs.push(blob.clone()));
        Ok(())
    }

    async fn finish(&mut self, outcome: RunOutcome) -> Result<()> {
        self.with_run(|run| run.finishes.push(outcome));
        if self.store.state.lock().unwrap().fail_finish {
            return Err(CoreError::Remote("finish rejected".to_string()));
        }
        Ok(())
    }
}

// ===== Result fixtures =====

/// Write `{dir}/{task}.json` with one variant per value.
pub fn write_result(dir: &Path, task: &str, metric: &str, values: &[f64]) {
    let results: serde_json::Map<String, serde_json::Value> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let mut variant = serde_json::Map::new();
            variant.insert(metric.to_string(), serde_json::json!(value));
            variant.insert("alias".to_string(), serde_json::json!(task));
            (format!("{}_{}", task, i), serde_json::Value::Object(variant))
        })
        .collect();
    let document = serde_json::json!({
        "results": results,
        "config": {"model": "hf-causal", "batch_size": 8},
    });
    fs::write(
        dir.join(format!("{}.json", task)),
        serde_json::to_string_pretty(&document).unwrap(),
    )
    .unwrap();
}

pub fn leaderboard_table(model: &str, scores: &[(&str, Cell)], average: f64, elapsed: i64) -> ResultTable {
    let mut columns = vec![MODEL_NAME_COLUMN.to_string(), AVERAGE_COLUMN.to_string()];
    let mut row = vec![Cell::from(model), Cell::Number(average)];
    for (name, cell) in scores {
        columns.push(name.to_string());
        row.push(cell.clone());
    }
    columns.push(ELAPSED_TIME_COLUMN.to_string());
    row.push(Cell::Integer(elapsed));
    ResultTable::from_parts(columns, vec![row]).unwrap()
}

pub fn locator() -> RunLocator {
    RunLocator::new("entity", "project").unwrap()
}
