//! [`RunStore`] over the tracker HTTP API

use crate::archive::pack_directory;
use crate::resources::artifacts::UploadArtifactRequest;
use crate::resources::runs::{CreateRunRequest, ResumeRunRequest, SearchRunsRequest};
use crate::resources::tables::TablePayload;
use crate::TrackerClient;
use async_trait::async_trait;
use eval_tracker_core::{
    BlobSpec, CoreError, ResultTable, RunFilter, RunInit, RunLocator, RunOutcome, RunRecord,
    RunSession, RunStore,
};
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, CoreError>;

#[async_trait]
impl RunStore for TrackerClient {
    async fn list_runs(&self, locator: &RunLocator, filter: &RunFilter) -> Result<Vec<RunRecord>> {
        let runs = self
            .runs()
            .search(locator, &SearchRunsRequest::from(filter))
            .await?;

        // The server filters on the raw config, which may still be wrapped.
        let mut records = Vec::with_capacity(runs.len());
        for run in runs {
            let record = run.into_record()?;
            if filter.matches(&record.config) {
                records.push(record);
            }
        }
        debug!("{} runs match {}", records.len(), filter);
        Ok(records)
    }

    async fn open_run(&self, locator: &RunLocator, init: RunInit) -> Result<Box<dyn RunSession>> {
        let run = match init.id {
            Some(id) => {
                self.runs()
                    .resume(locator, &id, ResumeRunRequest { config: init.config })
                    .await?
            }
            None => {
                let mut request = CreateRunRequest::new(init.config);
                request.name = init.name;
                self.runs().create(locator, request).await?
            }
        };
        info!("Opened run {}", run.id);

        Ok(Box::new(HttpRunSession {
            client: self.clone(),
            locator: locator.clone(),
            run_id: run.id,
            finished: false,
        }))
    }

    async fn fetch_latest_table(
        &self,
        locator: &RunLocator,
        run_id: &str,
        table_name: &str,
    ) -> Result<ResultTable> {
        let key = self.table_storage_key(run_id, table_name);
        debug!("Fetching latest {} from {}", table_name, key);
        let payload = self.tables().latest(locator, &key, table_name).await?;
        ResultTable::try_from(payload)
    }
}

/// An open run on the tracker
#[derive(Debug)]
pub struct HttpRunSession {
    client: TrackerClient,
    locator: RunLocator,
    run_id: String,
    finished: bool,
}

impl HttpRunSession {
    fn ensure_open(&self) -> Result<()> {
        if self.finished {
            return Err(CoreError::Remote(format!(
                "Run {} is already finished",
                self.run_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RunSession for HttpRunSession {
    fn run_id(&self) -> &str {
        &self.run_id
    }

    async fn publish_table(&mut self, table_name: &str, table: &ResultTable) -> Result<()> {
        self.ensure_open()?;
        let version = self
            .client
            .tables()
            .publish(
                &self.locator,
                &self.run_id,
                table_name,
                &TablePayload::from(table),
            )
            .await?;
        debug!("Published {} as {} {}", table_name, version.artifact, version.version);
        Ok(())
    }

    async fn upload_blob(&mut self, blob: &BlobSpec) -> Result<()> {
        self.ensure_open()?;
        let archive = pack_directory(&blob.source_dir)?;
        let request = UploadArtifactRequest::new(&blob.name, blob.type_label());
        let version = self
            .client
            .artifacts()
            .upload(&self.locator, &self.run_id, &request, archive)
            .await?;
        debug!("Uploaded {} {}", version.name, version.version);
        Ok(())
    }

    async fn finish(&mut self, outcome: RunOutcome) -> Result<()> {
        self.ensure_open()?;
        self.finished = true;
        self.client
            .runs()
            .finish(&self.locator, &self.run_id, outcome.into())
            .await?;
        Ok(())
    }
}

impl Drop for HttpRunSession {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Run {} dropped without being finished", self.run_id);
        }
    }
}
