use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use validator::Validate;

use crate::error::{CoreError, Result};

/// Config key holding the evaluated model; the run lookup filters on it.
pub const TARGET_MODEL_KEY: &str = "target_model";
pub const COMMIT_ID_KEY: &str = "lm_evaluation_harness_commit_id";
pub const BATCH_SIZE_KEY: &str = "batch_size";
/// Config key holding task columns dropped from the average.
pub const EXCLUDED_TASKS_KEY: &str = "average_exclude_tasks";

// ===== Locator / Filter =====

/// Entity and project a run lives under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RunLocator {
    #[validate(length(min = 1, max = 255))]
    pub entity: String,
    #[validate(length(min = 1, max = 255))]
    pub project: String,
}

impl RunLocator {
    pub fn new(entity: impl Into<String>, project: impl Into<String>) -> Result<Self> {
        let locator = Self {
            entity: entity.into(),
            project: project.into(),
        };
        locator.validate()?;
        Ok(locator)
    }

    pub fn path(&self) -> String {
        format!("{}/{}", self.entity, self.project)
    }
}

impl fmt::Display for RunLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity, self.project)
    }
}

/// Equality filter on one config field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFilter {
    pub config_key: String,
    pub value: String,
}

impl RunFilter {
    pub fn target_model(model: impl Into<String>) -> Self {
        Self {
            config_key: TARGET_MODEL_KEY.to_string(),
            value: model.into(),
        }
    }

    /// Field path as the tracking service spells it, e.g. `config.target_model`.
    pub fn field(&self) -> String {
        format!("config.{}", self.config_key)
    }

    pub fn matches(&self, config: &RunConfig) -> bool {
        config.get(&self.config_key).and_then(Value::as_str) == Some(self.value.as_str())
    }
}

impl fmt::Display for RunFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field(), self.value)
    }
}

// ===== Config =====

/// Run configuration as a plain key/value mapping. The schema belongs to
/// whoever wrote the run, so values stay opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunConfig(Map<String, Value>);

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a plain mapping from the persisted representation, which
    /// wraps every entry as `{"value": ..., "desc": ...}` and may arrive
    /// JSON-encoded in a string. Entries without the envelope pass through.
    pub fn from_persisted(persisted: &Value) -> Result<Self> {
        let decoded;
        let persisted = match persisted {
            Value::String(text) => {
                decoded = serde_json::from_str::<Value>(text)?;
                &decoded
            }
            other => other,
        };

        let entries = match persisted {
            Value::Object(entries) => entries,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(CoreError::Serialization(format!(
                    "run config must be an object, got {}",
                    other
                )))
            }
        };

        let config = entries
            .iter()
            .map(|(key, entry)| {
                let value = match entry {
                    Value::Object(envelope) if envelope.contains_key("value") => {
                        envelope["value"].clone()
                    }
                    other => other.clone(),
                };
                (key.clone(), value)
            })
            .collect();

        Ok(Self(config))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn target_model(&self) -> Option<&str> {
        self.get(TARGET_MODEL_KEY).and_then(Value::as_str)
    }

    /// Task columns persisted as excluded from the average.
    pub fn excluded_tasks(&self) -> Vec<String> {
        self.get(EXCLUDED_TASKS_KEY)
            .and_then(Value::as_array)
            .map(|tasks| {
                tasks
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_excluded_tasks(&mut self, tasks: &[String]) {
        self.insert(EXCLUDED_TASKS_KEY, tasks.to_vec());
    }
}

// ===== Run =====

/// A run as returned by the store's lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub name: Option<String>,
    pub config: RunConfig,
}

/// Parameters for opening a run session: a fresh run when `id` is `None`,
/// otherwise a resume of that run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunInit {
    pub id: Option<String>,
    pub name: Option<String>,
    pub config: RunConfig,
}

impl RunInit {
    pub fn create(config: RunConfig) -> Self {
        Self {
            id: None,
            name: None,
            config,
        }
    }

    pub fn resume(id: impl Into<String>, config: RunConfig) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
            config,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_resume(&self) -> bool {
        self.id.is_some()
    }
}

/// How a session ended; reported to the store when it is finalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Succeeded,
    Failed,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Succeeded => 0,
            RunOutcome::Failed => 1,
        }
    }
}
