//! Configuration management for the RAX FTP client
//!
//! Separates the server being talked to from the tunables of the state
//! machine. Both load from `config.toml` with environment overrides.

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;

use crate::client::ServerInfo;

const ENV_PREFIX: &str = "RAX_FTP_CLIENT";

/// Complete client configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub server: ServerInfo,

    #[serde(default)]
    pub settings: ClientSettings,
}

/// Tunables of the client state machine. Every field has a default.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientSettings {
    /// How long each reply wait may take
    pub reply_timeout_ms: u64,

    /// Bound on opening the control or data connection
    pub connect_timeout_ms: u64,

    /// Pause between steps when a transfer runs to completion internally
    pub step_interval_ms: u64,

    /// Download buffer; the final size is unknown up front
    pub download_buffer_size: usize,

    /// Ceiling for the upload buffer, which is otherwise sized to the file
    pub upload_buffer_cap: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            reply_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
            step_interval_ms: 25,
            download_buffer_size: 2048,
            upload_buffer_cap: 8192,
        }
    }
}

impl ClientConfig {
    /// Load configuration from `config.toml` with environment overrides.
    ///
    /// An explicit `path` is used alone; otherwise the installed location is
    /// tried before the working directory.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let config_paths = match path {
            Some(path) => vec![path],
            None => vec![
                "rax-ftp-client/config", // Installed: /app/rax-ftp-client/config.toml
                "config",                // Local development: ./config.toml
            ],
        };

        let mut last_error = None;

        for config_path in &config_paths {
            let built = Config::builder()
                .add_source(File::with_name(config_path))
                .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                .build();

            match built {
                Ok(settings) => return Self::from_config(settings),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            config::ConfigError::Message(format!("no configuration found in {config_paths:?}"))
        }))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Self::from_config(settings)
    }

    fn from_config(settings: Config) -> Result<Self, config::ConfigError> {
        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "server.host cannot be empty".into(),
            ));
        }

        if self.server.port == 0 {
            return Err(config::ConfigError::Message(
                "server.port cannot be 0".into(),
            ));
        }

        if self.settings.step_interval_ms == 0 {
            return Err(config::ConfigError::Message(
                "step_interval_ms must be greater than 0".into(),
            ));
        }

        if self.settings.download_buffer_size == 0 || self.settings.upload_buffer_cap == 0 {
            return Err(config::ConfigError::Message(
                "transfer buffer sizes must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

impl ClientSettings {
    /// Get reply timeout as Duration
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}
