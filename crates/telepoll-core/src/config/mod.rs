mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::TelepollError;
use defaults::*;

/// Environment variable consulted when the config file has no token.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Largest batch `getUpdates` accepts.
pub const MAX_LIMIT: u32 = 100;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bot identity and the handler to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub token: String,
    /// Name of a registered handler.
    #[serde(default = "default_handler")]
    pub handler: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            handler: default_handler(),
        }
    }
}

/// Long-polling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Max updates per fetch (1..=100).
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Server-side long-poll wait.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub starting_offset: i64,
    /// Consecutive fetch failures tolerated; one more is fatal. 0 = fail fast.
    #[serde(default = "default_max_failures")]
    pub max_consecutive_failures: u32,
    /// Pause before retrying a failed fetch.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Where to persist the offset between runs. Unset = not persisted.
    #[serde(default)]
    pub offset_file: Option<String>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
            starting_offset: 0,
            max_consecutive_failures: default_max_failures(),
            retry_delay_ms: default_retry_delay_ms(),
            offset_file: None,
        }
    }
}

impl PollingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of `debug`, `info`, `warn`, `error`. `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file. Unset = stderr.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    /// Fill an empty token from the given environment value.
    pub fn apply_env_token(&mut self, env_token: Option<String>) {
        if self.bot.token.is_empty() {
            if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
                self.bot.token = token.trim().to_string();
            }
        }
    }

    /// Check values the runner cannot work with.
    pub fn validate(&self) -> Result<(), TelepollError> {
        if self.bot.token.is_empty() {
            return Err(TelepollError::Config(format!(
                "bot token is empty. Set it in the config file, with --token, or in {TOKEN_ENV}."
            )));
        }
        if self.polling.limit == 0 || self.polling.limit > MAX_LIMIT {
            return Err(TelepollError::Config(format!(
                "polling.limit must be between 1 and {MAX_LIMIT}, got {}",
                self.polling.limit
            )));
        }
        if self.polling.starting_offset < 0 {
            return Err(TelepollError::Config(format!(
                "polling.starting_offset must not be negative, got {}",
                self.polling.starting_offset
            )));
        }
        if !matches!(
            self.logging.level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(TelepollError::Config(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Parse configuration from TOML text.
pub fn parse(content: &str) -> Result<Config, TelepollError> {
    toml::from_str(content)
        .map_err(|e| TelepollError::Config(format!("failed to parse config: {e}")))
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. An empty token is
/// filled from `TELEGRAM_BOT_TOKEN`. Logs nothing: this runs before the
/// subscriber is installed.
pub fn load(path: &str) -> Result<Config, TelepollError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TelepollError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        parse(&content)?
    } else {
        Config::default()
    };

    config.apply_env_token(std::env::var(TOKEN_ENV).ok());
    Ok(config)
}
