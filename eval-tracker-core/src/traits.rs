use async_trait::async_trait;

use crate::domain::{BlobSpec, ResultTable, RunFilter, RunInit, RunLocator, RunOutcome, RunRecord};
use crate::error::{CoreError, Result};

/// The experiment-tracking service, seen as a store of runs, tables and
/// versioned blobs.
///
/// There is no transaction protocol: two writers amending the same run race,
/// and the last table published wins.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// All runs under `locator` whose config matches `filter`.
    async fn list_runs(&self, locator: &RunLocator, filter: &RunFilter) -> Result<Vec<RunRecord>>;

    /// Open a session on a new run, or on an existing one when `init.id` is
    /// set. The session must be finalised with [`RunSession::finish`].
    async fn open_run(&self, locator: &RunLocator, init: RunInit) -> Result<Box<dyn RunSession>>;

    /// Latest published version of `table_name` for `run_id`.
    async fn fetch_latest_table(
        &self,
        locator: &RunLocator,
        run_id: &str,
        table_name: &str,
    ) -> Result<ResultTable>;

    /// The single run matching `filter`. Zero or several matches is a
    /// precondition violation.
    async fn find_run(&self, locator: &RunLocator, filter: &RunFilter) -> Result<RunRecord> {
        let mut runs = self.list_runs(locator, filter).await?;
        if runs.len() != 1 {
            return Err(CoreError::RunLookup {
                filter: filter.to_string(),
                count: runs.len(),
            });
        }
        Ok(runs.remove(0))
    }

    /// Name of the artifact a published table is stored in.
    fn table_storage_key(&self, run_id: &str, table_name: &str) -> String {
        table_storage_key(run_id, table_name)
    }
}

/// The store drops `-` from table names when it derives the backing
/// artifact name, so reads must derive the key the same way.
pub fn table_storage_key(run_id: &str, table_name: &str) -> String {
    format!("run-{}-{}", run_id, table_name.replace('-', ""))
}

/// An open run. Publishing a table or uploading a blob creates a new version
/// on the store; earlier versions stay retrievable.
#[async_trait]
pub trait RunSession: Send {
    fn run_id(&self) -> &str;

    async fn publish_table(&mut self, table_name: &str, table: &ResultTable) -> Result<()>;

    async fn upload_blob(&mut self, blob: &BlobSpec) -> Result<()>;

    /// Flush and close the run. Nothing may be published afterwards.
    async fn finish(&mut self, outcome: RunOutcome) -> Result<()>;
}
