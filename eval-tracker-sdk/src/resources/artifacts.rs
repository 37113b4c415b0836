//! Artifacts resource client
//!
//! Uploads a packed directory as a new version of a named artifact. The
//! server keeps every earlier version.

use super::project_path;
use crate::archive::PackedDirectory;
use crate::client::{BinaryBody, HttpClient};
use crate::error::SdkResult;
use eval_tracker_core::RunLocator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Header carrying the sha256 of the uploaded archive
pub const DIGEST_HEADER: &str = "X-Artifact-Digest";

/// Client for artifact operations
#[derive(Debug, Clone)]
pub struct ArtifactsClient {
    client: Arc<HttpClient>,
}

impl ArtifactsClient {
    /// Create a new artifacts client
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Upload `archive` as the next version of `request.name`, attached to
    /// a run
    pub async fn upload(
        &self,
        locator: &RunLocator,
        run_id: &str,
        request: &UploadArtifactRequest,
        archive: PackedDirectory,
    ) -> SdkResult<ArtifactVersion> {
        let body = BinaryBody {
            content_type: "application/gzip",
            headers: vec![(DIGEST_HEADER, archive.digest)],
            bytes: archive.bytes,
        };
        self.client
            .post_bytes(
                &project_path(locator, &["runs", run_id, "artifacts"]),
                request,
                body,
            )
            .await
    }
}

/// Query parameters of an upload
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UploadArtifactRequest {
    /// Artifact name, e.g. `org.model.result`
    pub name: String,
    /// Artifact type label
    #[serde(rename = "type")]
    pub artifact_type: String,
}

impl UploadArtifactRequest {
    /// Create a new request
    pub fn new(name: impl Into<String>, artifact_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artifact_type: artifact_type.into(),
        }
    }
}

/// Version created by an upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactVersion {
    /// Artifact name
    pub name: String,
    /// Version label, e.g. `v0`
    pub version: String,
    /// Digest the server computed, when it reports one
    #[serde(default)]
    pub digest: Option<String>,
}
