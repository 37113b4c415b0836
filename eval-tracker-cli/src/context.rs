//! CLI execution context

use anyhow::{Context as _, Result};
use eval_tracker_core::RunLocator;
use eval_tracker_sdk::{AuthConfig, SdkConfig, TrackerClient};
use eval_tracker_workflow::RunTableWriter;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::cli::Cli;
use crate::config::{AuthMethod, CliConfig, Profile};
use crate::output::{OutputFormat, OutputWriter};

/// Keyring service the CLI stores secrets under
pub const KEYRING_SERVICE: &str = "eval-tracker";

/// Failures resolving credentials
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("No {kind} stored in the keyring for profile {profile}")]
    NotInKeyring { kind: &'static str, profile: String },

    #[error("Keyring unavailable: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Execution context for CLI commands
pub struct Context {
    /// CLI configuration
    pub config: CliConfig,

    /// Active profile name
    pub profile_name: Option<String>,

    /// Active profile
    pub profile: Profile,

    /// Output format
    pub output_format: OutputFormat,

    /// Output writer
    pub output: OutputWriter,

    /// Verbose mode
    pub verbose: bool,

    /// API URL override
    pub api_url_override: Option<String>,

    /// API key override
    pub api_key_override: Option<String>,
}

impl Context {
    /// Create a new context from CLI arguments and the user's config file
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = CliConfig::load().unwrap_or_else(|e| {
            warn!("Ignoring configuration: {:#}", e);
            CliConfig::default()
        });
        Ok(Self::with_config(cli, config))
    }

    /// Create a context from CLI arguments and an already loaded config
    pub fn with_config(cli: &Cli, config: CliConfig) -> Self {
        let profile_name = cli.profile.clone().or_else(|| config.default_profile.clone());
        let profile = config
            .get_profile(profile_name.as_deref())
            .cloned()
            .unwrap_or_default();

        let output_format = cli.output;
        let output = OutputWriter::new(output_format, cli.no_color || !config.settings.color);

        Self {
            config,
            profile_name,
            profile,
            output_format,
            output,
            verbose: cli.verbose,
            api_url_override: cli.api_url.clone(),
            api_key_override: cli.api_key.clone(),
        }
    }

    /// Get the effective API URL
    pub fn api_url(&self) -> &str {
        self.api_url_override
            .as_deref()
            .unwrap_or_else(|| self.profile.api_url())
    }

    /// Get the SDK authentication configuration
    pub fn get_auth_config(&self) -> Result<AuthConfig> {
        if let Some(ref api_key) = self.api_key_override {
            return Ok(AuthConfig::ApiKey(api_key.clone()));
        }

        let profile_name = self.profile_name.as_deref().unwrap_or("default");

        let auth = match &self.profile.auth {
            AuthMethod::None => AuthConfig::None,
            AuthMethod::ApiKey { key, use_keyring } => {
                let key = if *use_keyring {
                    keyring_secret(profile_name, "api-key")?
                } else {
                    key.clone()
                };
                AuthConfig::ApiKey(key)
            }
            AuthMethod::BearerToken { token, use_keyring } => {
                let token = if *use_keyring {
                    keyring_secret(profile_name, "token")?
                } else {
                    token.clone()
                };
                AuthConfig::BearerToken(token)
            }
            AuthMethod::Basic {
                username,
                password,
                use_keyring,
            } => {
                let password = if *use_keyring {
                    keyring_secret(profile_name, "password")?
                } else {
                    password.clone()
                };
                AuthConfig::Basic {
                    username: username.clone(),
                    password,
                }
            }
        };
        Ok(auth)
    }

    /// Create an SDK client
    pub fn create_client(&self) -> Result<TrackerClient> {
        url::Url::parse(self.api_url())
            .with_context(|| format!("Invalid API URL: {}", self.api_url()))?;

        let auth = self.get_auth_config()?;
        let settings = &self.config.settings;

        let mut config = SdkConfig::new(self.api_url())
            .with_auth(auth)
            .with_timeout(Duration::from_secs(settings.timeout_secs))
            .with_connect_timeout(Duration::from_secs(settings.connect_timeout_secs));

        if self.verbose {
            config = config.with_logging(true);
        }

        for (name, value) in &self.profile.headers {
            config = config.with_header(name.clone(), value.clone());
        }

        TrackerClient::new(config).context("Failed to create API client")
    }

    /// Create the table writer for runs under `entity`/`project`
    pub fn create_writer(&self, entity: &str, project: &str) -> Result<RunTableWriter<TrackerClient>> {
        let locator = RunLocator::new(entity, project)
            .with_context(|| format!("Invalid run location {}/{}", entity, project))?;
        Ok(RunTableWriter::new(self.create_client()?, locator))
    }
}

/// Secret `kind` of `profile` from the system keyring
fn keyring_secret(profile: &str, kind: &'static str) -> Result<String, CredentialError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{}-{}", profile, kind))?;
    match entry.get_password() {
        Ok(secret) => Ok(secret),
        Err(keyring::Error::NoEntry) => Err(CredentialError::NotInKeyring {
            kind,
            profile: profile.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}
