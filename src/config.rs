//! Application configuration.
//!
//! Supports YAML file and environment variable overrides. The config
//! struct is passed into constructors explicitly; there is no ambient
//! global state.

use serde::Deserialize;
use std::path::Path;

/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "AGORA_CONFIG";
/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "AGORA_LOG";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Cart service endpoint configuration.
    pub cart_service: CartServiceConfig,
    /// Loyalty point conversion rates.
    pub rewards: RewardsConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type (sqlite).
    #[serde(rename = "type")]
    pub storage_type: String,
    /// Path to database file.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: "sqlite".to_string(),
            path: "./data/storefront.db".to_string(),
        }
    }
}

/// Cart service endpoint.
///
/// Cart data is owned by the cart service and reached over HTTP.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CartServiceConfig {
    /// Base URL of the cart service.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Service-to-service bearer token, if the cart service requires one.
    pub service_token: Option<String>,
}

impl Default for CartServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            timeout_secs: 10,
            service_token: None,
        }
    }
}

/// Loyalty point conversion rates.
///
/// Both rates are fixed, documented constants of the storefront: one
/// redeemed point is worth `redeem_rate` currency units of discount, and
/// one point is earned per `earn_divisor` currency units spent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    /// Currency units of discount per redeemed point.
    pub redeem_rate: i64,
    /// Currency units spent per earned point (floor division).
    pub earn_divisor: i64,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            redeem_rate: 1_000,
            earn_divisor: 10_000,
        }
    }
}

impl RewardsConfig {
    /// Monetary discount for redeeming `points`.
    pub fn discount_for_points(&self, points: i64) -> i64 {
        points.max(0) * self.redeem_rate
    }

    /// Points earned for spending `amount`, floor division.
    pub fn points_for_amount(&self, amount: i64) -> i64 {
        if amount <= 0 {
            return 0;
        }
        amount / self.earn_divisor
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = if Path::new(&config_path).exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("STORAGE_PATH") {
            self.storage.path = path;
        }

        if let Ok(url) = std::env::var("CART_SERVICE_URL") {
            self.cart_service.base_url = url;
        }

        if let Ok(token) = std::env::var("CART_SERVICE_TOKEN") {
            self.cart_service.service_token = Some(token);
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}
