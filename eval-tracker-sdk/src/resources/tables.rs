//! Tables resource client
//!
//! Publishing a table on a run stores it as a new version of the artifact
//! named by [`table_storage_key`](eval_tracker_core::table_storage_key).
//! Reading goes through that artifact.

use super::project_path;
use crate::client::HttpClient;
use crate::error::SdkResult;
use eval_tracker_core::{Cell, CoreError, ResultTable, RunLocator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Client for table operations
#[derive(Debug, Clone)]
pub struct TablesClient {
    client: Arc<HttpClient>,
}

impl TablesClient {
    /// Create a new tables client
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Log `table` on a run under `table_name`
    pub async fn publish(
        &self,
        locator: &RunLocator,
        run_id: &str,
        table_name: &str,
        table: &TablePayload,
    ) -> SdkResult<TableVersion> {
        self.client
            .post(
                &project_path(locator, &["runs", run_id, "tables", table_name]),
                table,
            )
            .await
    }

    /// Latest version of `table_name` stored in the artifact `storage_key`
    pub async fn latest(
        &self,
        locator: &RunLocator,
        storage_key: &str,
        table_name: &str,
    ) -> SdkResult<TablePayload> {
        self.client
            .get(&project_path(
                locator,
                &[
                    "artifacts",
                    storage_key,
                    "versions",
                    "latest",
                    "tables",
                    table_name,
                ],
            ))
            .await
    }
}

/// Table wire format: column names and row-major data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TablePayload {
    /// Column names
    pub columns: Vec<String>,
    /// Rows; NaN cells travel as `null`
    pub data: Vec<Vec<Cell>>,
}

impl From<&ResultTable> for TablePayload {
    fn from(table: &ResultTable) -> Self {
        Self {
            columns: table.columns().to_vec(),
            data: table.data().to_vec(),
        }
    }
}

impl TryFrom<TablePayload> for ResultTable {
    type Error = CoreError;

    fn try_from(payload: TablePayload) -> Result<Self, Self::Error> {
        ResultTable::from_parts(payload.columns, payload.data)
    }
}

/// Version created by a publish
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableVersion {
    /// Backing artifact name
    pub artifact: String,
    /// Version label, e.g. `v3`
    pub version: String,
}
