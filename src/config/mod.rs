//! Configuration loading and management
//!
//! Backend project identifiers are supplied at runtime, from YAML or from the
//! environment. None are compiled in.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::ConfigError;
use crate::routes::DEFAULT_PROTECTED_ROUTES;

/// Identifiers of the hosted backend project
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

// The API key stays out of logs.
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &"<redacted>")
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id)
            .field("measurement_id", &self.measurement_id)
            .finish()
    }
}

impl BackendConfig {
    /// Environment variable prefix used by [`BackendConfig::from_env`]
    pub const ENV_PREFIX: &'static str = "RHYE_";

    /// Load from `RHYE_*` environment variables
    ///
    /// `RHYE_MEASUREMENT_ID` is optional, every other key is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary `RHYE_*` key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |suffix: &str| lookup(&format!("{}{}", Self::ENV_PREFIX, suffix));
        let require = |suffix: &str| {
            get(suffix)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingKey {
                    key: format!("{}{}", Self::ENV_PREFIX, suffix),
                })
        };

        Ok(Self {
            api_key: require("API_KEY")?,
            auth_domain: require("AUTH_DOMAIN")?,
            project_id: require("PROJECT_ID")?,
            storage_bucket: require("STORAGE_BUCKET")?,
            messaging_sender_id: require("MESSAGING_SENDER_ID")?,
            app_id: require("APP_ID")?,
            measurement_id: get("MEASUREMENT_ID").filter(|value| !value.trim().is_empty()),
        })
    }

    /// Reject empty required keys
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("apiKey", &self.api_key),
            ("authDomain", &self.auth_domain),
            ("projectId", &self.project_id),
            ("storageBucket", &self.storage_bucket),
            ("messagingSenderId", &self.messaging_sender_id),
            ("appId", &self.app_id),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((key, _)) => Err(ConfigError::MissingKey {
                key: key.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Route guard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// Path prefixes that require an authenticated session
    #[serde(default = "default_protected_routes")]
    pub protected_routes: Vec<String>,
}

fn default_protected_routes() -> Vec<String> {
    DEFAULT_PROTECTED_ROUTES
        .iter()
        .map(|route| route.to_string())
        .collect()
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            protected_routes: default_protected_routes(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,

    #[serde(default)]
    pub routes: RouteConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path))?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.backend.validate()?;
        Ok(config)
    }
}
