//! CLI configuration management
//!
//! `config.toml` in the platform config directory, layered with
//! `EVAL_TRACKER_*` environment variables. Nested keys use `__`, e.g.
//! `EVAL_TRACKER_SETTINGS__TIMEOUT_SECS=600`.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default API URL
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "EVAL_TRACKER";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Default profile to use
    #[serde(default)]
    pub default_profile: Option<String>,

    /// Named profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

impl CliConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, which may be absent
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "eval-tracker", "eval-tracker")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get a profile by name
    pub fn get_profile(&self, name: Option<&str>) -> Option<&Profile> {
        let profile_name = name.or(self.default_profile.as_deref())?;
        self.profiles.get(profile_name)
    }
}

/// A configuration profile
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    /// API base URL
    #[serde(default)]
    pub api_url: Option<String>,

    /// Authentication method
    #[serde(default)]
    pub auth: AuthMethod,

    /// Additional headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Profile {
    /// Get the API URL, falling back to default
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }
}

/// Authentication method configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthMethod {
    /// No authentication
    #[default]
    None,
    /// API key authentication
    ApiKey {
        /// The API key; ignored when `use_keyring` is set
        #[serde(default)]
        key: String,
        /// Whether the key is stored in system keyring
        #[serde(default)]
        use_keyring: bool,
    },
    /// Bearer token authentication
    BearerToken {
        /// The token; ignored when `use_keyring` is set
        #[serde(default)]
        token: String,
        /// Whether the token is stored in system keyring
        #[serde(default)]
        use_keyring: bool,
    },
    /// Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password; ignored when `use_keyring` is set
        #[serde(default)]
        password: String,
        /// Whether the password is stored in system keyring
        #[serde(default)]
        use_keyring: bool,
    },
}

/// Global settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Request timeout in seconds; artifact uploads share it
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    10
}
