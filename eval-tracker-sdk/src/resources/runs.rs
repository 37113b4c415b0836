//! Runs resource client
//!
//! Search, create, resume and finish tracked runs.

use super::project_path;
use crate::client::HttpClient;
use crate::error::SdkResult;
use chrono::{DateTime, Utc};
use eval_tracker_core::{CoreError, RunConfig, RunFilter, RunLocator, RunOutcome, RunRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Client for run operations
#[derive(Debug, Clone)]
pub struct RunsClient {
    client: Arc<HttpClient>,
}

impl RunsClient {
    /// Create a new runs client
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Runs whose config matches every filter in `request`
    pub async fn search(
        &self,
        locator: &RunLocator,
        request: &SearchRunsRequest,
    ) -> SdkResult<Vec<RunInfo>> {
        let response: RunList = self
            .client
            .post(&project_path(locator, &["runs", "search"]), request)
            .await?;
        Ok(response.runs)
    }

    /// Create a new run
    pub async fn create(&self, locator: &RunLocator, request: CreateRunRequest) -> SdkResult<RunInfo> {
        self.client
            .post(&project_path(locator, &["runs"]), request)
            .await
    }

    /// Reopen an existing run, replacing its config
    pub async fn resume(
        &self,
        locator: &RunLocator,
        run_id: &str,
        request: ResumeRunRequest,
    ) -> SdkResult<RunInfo> {
        self.client
            .put(&project_path(locator, &["runs", run_id]), request)
            .await
    }

    /// Mark a run as finished
    pub async fn finish(
        &self,
        locator: &RunLocator,
        run_id: &str,
        request: FinishRunRequest,
    ) -> SdkResult<RunInfo> {
        self.client
            .post(&project_path(locator, &["runs", run_id, "finish"]), request)
            .await
    }
}

/// A run as the API returns it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunInfo {
    /// Run id
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Persisted config: `{key: {"value": ..., "desc": ...}}`, possibly
    /// JSON-encoded as a string
    #[serde(default)]
    pub config: serde_json::Value,
    /// Lifecycle state reported by the server
    #[serde(default)]
    pub state: Option<String>,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RunInfo {
    /// Convert to the domain record, unwrapping the persisted config
    pub fn into_record(self) -> Result<RunRecord, CoreError> {
        Ok(RunRecord {
            config: RunConfig::from_persisted(&self.config)?,
            id: self.id,
            name: self.name,
        })
    }
}

/// Response of the search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RunList {
    /// Matching runs
    pub runs: Vec<RunInfo>,
}

/// Request to search runs
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct SearchRunsRequest {
    /// Field path -> required value, e.g. `config.target_model`
    pub filters: BTreeMap<String, String>,
}

impl SearchRunsRequest {
    /// Create an empty search
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }
}

impl From<&RunFilter> for SearchRunsRequest {
    fn from(filter: &RunFilter) -> Self {
        Self::new().with_filter(filter.field(), filter.value.as_str())
    }
}

/// Request to create a run
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateRunRequest {
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Plain key/value config
    pub config: RunConfig,
}

impl CreateRunRequest {
    /// Create a new request
    pub fn new(config: RunConfig) -> Self {
        Self { name: None, config }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Request to reopen a run
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResumeRunRequest {
    /// Plain key/value config
    pub config: RunConfig,
}

/// Request to finish a run
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FinishRunRequest {
    /// 0 on success
    pub exit_code: i32,
}

impl From<RunOutcome> for FinishRunRequest {
    fn from(outcome: RunOutcome) -> Self {
        Self {
            exit_code: outcome.exit_code(),
        }
    }
}
