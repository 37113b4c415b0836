//! Eval Tracker SDK
//!
//! Rust client for the experiment tracker that stores evaluation runs. Runs
//! carry a flat config, versioned tables and versioned directory artifacts.
//!
//! [`TrackerClient`] implements [`RunStore`](eval_tracker_core::RunStore), so
//! it can be handed straight to the upload workflow.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use eval_tracker_core::{RunFilter, RunLocator, RunStore};
//! use eval_tracker_sdk::{AuthConfig, SdkConfig, TrackerClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SdkConfig::new("https://tracker.example.com")
//!         .with_auth(AuthConfig::ApiKey("your-api-key".to_string()));
//!     let client = TrackerClient::new(config)?;
//!
//!     let locator = RunLocator::new("my-team", "leaderboard")?;
//!     let run = client
//!         .find_run(&locator, &RunFilter::target_model("org/model"))
//!         .await?;
//!     println!("Found run {}", run.id);
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Resource clients return [`SdkError`]. Requests are sent once; a 429 comes
//! back as [`SdkError::RateLimited`] with the server's `Retry-After` hint.
//!
//! ```rust,no_run
//! use eval_tracker_core::RunLocator;
//! use eval_tracker_sdk::{SdkError, SearchRunsRequest, TrackerClient};
//!
//! async fn handle_errors(client: &TrackerClient, locator: &RunLocator) {
//!     match client.runs().search(locator, &SearchRunsRequest::new()).await {
//!         Ok(runs) => println!("Got {} runs", runs.len()),
//!         Err(SdkError::AuthenticationError(msg)) => eprintln!("Auth failed: {}", msg),
//!         Err(SdkError::RateLimited { retry_after }) => {
//!             eprintln!("Rate limited, retry after {:?} seconds", retry_after)
//!         }
//!         Err(e) => eprintln!("Other error: {}", e),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod archive;
pub mod client;
pub mod config;
pub mod error;
pub mod resources;
pub mod store;

pub use archive::{pack_directory, ManifestEntry, PackedDirectory};
pub use client::{BinaryBody, HttpClient};
pub use config::{AuthConfig, SdkConfig, API_KEY_HEADER};
pub use error::{SdkError, SdkResult};
pub use store::HttpRunSession;

pub use resources::artifacts::{ArtifactVersion, ArtifactsClient, UploadArtifactRequest};
pub use resources::runs::{
    CreateRunRequest, FinishRunRequest, ResumeRunRequest, RunInfo, RunList, RunsClient,
    SearchRunsRequest,
};
pub use resources::tables::{TablePayload, TableVersion, TablesClient};

use std::sync::Arc;

/// The main client for the tracker API.
///
/// Resource clients share one [`HttpClient`], so cloning a `TrackerClient`
/// is cheap.
///
/// # Example
///
/// ```rust,no_run
/// use eval_tracker_sdk::{AuthConfig, TrackerClient};
/// use std::time::Duration;
///
/// let client = TrackerClient::builder("https://tracker.example.com")
///     .with_auth(AuthConfig::ApiKey("key".to_string()))
///     .with_timeout(Duration::from_secs(60))
///     .build()?;
/// # Ok::<(), eval_tracker_sdk::SdkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TrackerClient {
    http_client: Arc<HttpClient>,
    runs: RunsClient,
    tables: TablesClient,
    artifacts: ArtifactsClient,
}

impl TrackerClient {
    /// Create a new client, validating `config`
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        let http_client = Arc::new(HttpClient::new(config)?);

        Ok(Self {
            runs: RunsClient::new(Arc::clone(&http_client)),
            tables: TablesClient::new(Arc::clone(&http_client)),
            artifacts: ArtifactsClient::new(Arc::clone(&http_client)),
            http_client,
        })
    }

    /// Start a [`ClientBuilder`]
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// Run search and lifecycle
    pub fn runs(&self) -> &RunsClient {
        &self.runs
    }

    /// Table publishing and reads
    pub fn tables(&self) -> &TablesClient {
        &self.tables
    }

    /// Artifact uploads
    pub fn artifacts(&self) -> &ArtifactsClient {
        &self.artifacts
    }

    /// Get a reference to the underlying HTTP client.
    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Get the base URL of the API.
    pub fn base_url(&self) -> &str {
        &self.http_client.config().base_url
    }
}

/// Builder for creating a [`TrackerClient`] with fluent configuration.
#[derive(Debug)]
pub struct ClientBuilder {
    config: SdkConfig,
}

impl ClientBuilder {
    /// Create a new client builder with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: SdkConfig::new(base_url),
        }
    }

    /// Set the authentication configuration.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.config = self.config.with_auth(auth);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config = self.config.with_connect_timeout(timeout);
        self
    }

    /// Enable or disable request/response logging.
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.config = self.config.with_logging(enable);
        self
    }

    /// Add a custom header to all requests.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config = self.config.with_header(name, value);
        self
    }

    /// Build the client.
    pub fn build(self) -> SdkResult<TrackerClient> {
        TrackerClient::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_creation() {
        let client = TrackerClient::new(SdkConfig::new("https://tracker.example.com")).unwrap();
        assert_eq!(client.base_url(), "https://tracker.example.com");
    }

    #[test]
    fn test_client_builder() {
        let client = TrackerClient::builder("https://tracker.example.com")
            .with_auth(AuthConfig::ApiKey("test-key".to_string()))
            .with_timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(client.http_client().config().timeout, Duration::from_secs(60));
        assert!(client.http_client().config().auth.is_configured());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(TrackerClient::new(SdkConfig::new("ftp://tracker.example.com")).is_err());
    }
}
