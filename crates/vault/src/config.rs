//! Configuration loading and validation.
//!
//! All values are read from environment variables when the application
//! starts. Loading fails with a clear error message if a required variable is
//! missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::DecryptMode;
use crate::key::{KeyError, SessionKey};
use crate::store::StoreOptions;

/// Validated fleet-vault configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Deployment-wide secret mixed into every user's session key. **Required.**
    pub app_secret: String,

    /// Handling of untagged sensitive values on read (`strict` or `lenient`).
    #[serde(default)]
    pub decrypt_mode: DecryptMode,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_secret", &"[REDACTED]")
            .field("decrypt_mode", &self.decrypt_mode)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.app_secret, "APP_SECRET")?;
        ensure_non_empty(&self.log_level, "LOG_LEVEL")?;
        Ok(())
    }

    /// Store options derived from this configuration.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            decrypt_mode: self.decrypt_mode,
        }
    }

    /// Session key of `user_id` under this deployment's secret.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::EmptyUserId`] for an empty user id.
    pub fn session_key_for(&self, user_id: &str) -> Result<SessionKey, KeyError> {
        SessionKey::for_user(user_id, &self.app_secret)
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
