//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; every section has defaults, and
//! `STOREFRONT_CATALOG_URL` / `STOREFRONT_DATABASE` override the file.
//!
//! # Example
//!
//! ```no_run
//! use storefront::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("storefront.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::cart::{CartConfig, CheckoutConfig};
use super::logging::LoggingConfig;
use crate::adapter::outbound::fakestore::settings::CatalogConfig;
use crate::adapter::outbound::sqlite::database::connection::IN_MEMORY;
use crate::error::{ConfigError, Result};

/// Default config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "storefront.toml";

/// Overrides `catalog.base_url`.
pub const ENV_CATALOG_URL: &str = "STOREFRONT_CATALOG_URL";
/// Overrides `database`.
pub const ENV_DATABASE: &str = "STOREFRONT_DATABASE";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the SQLite cart database, or `:memory:`.
    ///
    /// Defaults to "storefront.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Remote catalog connection settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub cart: CartConfig,

    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_database_path() -> String {
    "storefront.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            catalog: CatalogConfig::default(),
            cart: CartConfig::default(),
            checkout: CheckoutConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Environment overrides are applied before validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] when the file exists; validation errors
    /// otherwise.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    /// Apply environment-style overrides. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        if let Some(url) = non_blank(ENV_CATALOG_URL) {
            self.catalog.base_url = url;
        }
        if let Some(database) = non_blank(ENV_DATABASE) {
            self.database = database;
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first field that is missing or out of range.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }

        let base_url = self.catalog.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::MissingField { field: "base_url" }.into());
        }
        match url::Url::parse(base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::InvalidValue {
                    field: "base_url",
                    reason: format!("unsupported scheme '{}', expected http or https", url.scheme()),
                }
                .into());
            }
            Err(e) => {
                return Err(ConfigError::InvalidValue {
                    field: "base_url",
                    reason: e.to_string(),
                }
                .into());
            }
        }

        if self.catalog.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.catalog.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connect_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.cart.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel_capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be 'pretty' or 'json'".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// True when the cart lives only for this process.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.database == IN_MEMORY
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
