//! Configuration and settings management
//!
//! Loads settings from environment variables and defines retry constants.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Base URL of the hosting API used for server discovery
    #[serde(default = "default_hosting_api_base")]
    pub hosting_api_base: String,

    /// Host suffix for per-server upload endpoints (`https://<server>.<host>`)
    #[serde(default = "default_hosting_upload_host")]
    pub hosting_upload_host: String,

    /// Flat upload base URL override. When set, uploads go to
    /// `<base>/uploadFile` regardless of the discovered server. Intended for
    /// self-hosted instances and tests.
    pub hosting_upload_base: Option<String>,

    /// Connect timeout for hosting API calls, in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Overall request timeout for hosting API calls, in seconds.
    /// Covers the whole upload body, so it must accommodate large files.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Extra attempts for the hosting exchange after the first failure.
    /// The default of 0 keeps the fail-fast behavior.
    #[serde(default)]
    pub upload_retries: usize,
}

fn default_hosting_api_base() -> String {
    "https://api.gofile.io".to_string()
}

fn default_hosting_upload_host() -> String {
    "gofile.io".to_string()
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_request_timeout_secs() -> u64 {
    300
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gofile_relay::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked into git
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of APP)
            .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true))
            // Also add settings from environment variables directly (without prefix)
            // Note: Environment::default() auto-converts UPPER_SNAKE_CASE to snake_case
            // ignore_empty treats empty env vars as unset; try_parsing
            // converts numeric values for the timeout/retry fields
            .add_source(Environment::default().ignore_empty(true).try_parsing(true))
            .build()?;

        s.try_deserialize()
    }
}

// Telegram API retry strategy (get_file / download_file / send / edit)
/// Maximum retry attempts for Telegram API operations
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
/// Initial backoff delay for Telegram API retries
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Maximum backoff delay for Telegram API retries
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;

// Hosting exchange retry strategy, active only when `upload_retries` > 0
/// Initial backoff delay for hosting exchange retries
pub const UPLOAD_INITIAL_BACKOFF_MS: u64 = 1000;
/// Maximum backoff delay for hosting exchange retries
pub const UPLOAD_MAX_BACKOFF_MS: u64 = 8000;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Env mutations run inside a single test to avoid race conditions
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        // 1. Defaults with only the required token present
        env::set_var("TELEGRAM_TOKEN", "dummy_token");

        let settings = Settings::new()?;
        assert_eq!(settings.telegram_token, "dummy_token");
        assert_eq!(settings.hosting_api_base, "https://api.gofile.io");
        assert_eq!(settings.hosting_upload_host, "gofile.io");
        assert_eq!(settings.hosting_upload_base, None);
        assert_eq!(settings.upload_retries, 0);
        assert_eq!(settings.connect_timeout_secs, 10);
        assert_eq!(settings.request_timeout_secs, 300);

        // 2. Explicit overrides
        env::set_var("HOSTING_UPLOAD_BASE", "http://127.0.0.1:9999");
        env::set_var("UPLOAD_RETRIES", "2");

        let settings = Settings::new()?;
        assert_eq!(
            settings.hosting_upload_base,
            Some("http://127.0.0.1:9999".to_string())
        );
        assert_eq!(settings.upload_retries, 2);

        // 3. Empty env var treated as unset
        env::set_var("HOSTING_UPLOAD_BASE", "");

        let settings = Settings::new()?;
        assert_eq!(settings.hosting_upload_base, None);

        env::remove_var("HOSTING_UPLOAD_BASE");
        env::remove_var("UPLOAD_RETRIES");
        env::remove_var("TELEGRAM_TOKEN");
        Ok(())
    }
}
