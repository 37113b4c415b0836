//! Connection settings for the tracker API.
//!
//! There is no retry configuration: a failed call is reported to the caller
//! as-is.

use crate::error::{SdkError, SdkResult};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Header carrying [`AuthConfig::ApiKey`].
pub const API_KEY_HEADER: &str = "X-API-Key";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// How the client reaches the tracker.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Root of the API; resource paths are joined onto it
    pub base_url: String,

    /// Credentials for every request
    pub auth: AuthConfig,

    /// Whole-request timeout. Artifact uploads share it, so raise it for
    /// large write-out directories.
    pub timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// `User-Agent` header value
    pub user_agent: String,

    /// Log every request and response status at debug level
    pub enable_logging: bool,

    /// Sent with every request, after the auth header
    pub custom_headers: Vec<(String, String)>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth: AuthConfig::None,
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("eval-tracker-sdk/{}", env!("CARGO_PKG_VERSION")),
            enable_logging: false,
            custom_headers: Vec::new(),
        }
    }
}

impl SdkConfig {
    /// Defaults pointed at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the credentials
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Toggle request logging
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }

    /// Add a header sent with every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Parse the base URL, rejecting anything resource paths cannot be
    /// joined onto.
    pub fn base(&self) -> SdkResult<Url> {
        if self.base_url.trim().is_empty() {
            return Err(SdkError::ConfigurationError(
                "Base URL cannot be empty".to_string(),
            ));
        }

        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SdkError::ConfigurationError(format!(
                "Unsupported URL scheme: {}",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() || url.query().is_some() {
            return Err(SdkError::ConfigurationError(format!(
                "{} cannot carry resource paths",
                self.base_url
            )));
        }
        Ok(url)
    }

    /// Check the URL and timeouts before any request is made
    pub fn validate(&self) -> SdkResult<()> {
        self.base()?;

        if self.timeout.is_zero() {
            return Err(SdkError::ConfigurationError(
                "Timeout cannot be zero".to_string(),
            ));
        }
        if self.connect_timeout > self.timeout {
            return Err(SdkError::ConfigurationError(format!(
                "Connect timeout {:?} exceeds request timeout {:?}",
                self.connect_timeout, self.timeout
            )));
        }
        Ok(())
    }
}

/// Credentials attached to every request. `Debug` never prints secrets.
#[derive(Clone)]
pub enum AuthConfig {
    /// Anonymous access
    None,

    /// Sent as [`API_KEY_HEADER`]
    ApiKey(String),

    /// `Authorization: Bearer`
    BearerToken(String),

    /// `Authorization: Basic`
    Basic {
        /// User name
        username: String,
        /// Password
        password: String,
    },
}

impl AuthConfig {
    /// Whether any credentials are set
    pub fn is_configured(&self) -> bool {
        !matches!(self, AuthConfig::None)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::None => write!(f, "None"),
            AuthConfig::ApiKey(_) => write!(f, "ApiKey(***)"),
            AuthConfig::BearerToken(_) => write!(f, "BearerToken(***)"),
            AuthConfig::Basic { username, .. } => {
                write!(f, "Basic {{ username: {:?}, password: *** }}", username)
            }
        }
    }
}
