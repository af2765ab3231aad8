//! Client configuration
//!
//! Configuration is a single JSON file:
//!
//! ```json
//! {
//!   "url": "http://localhost:5984",
//!   "database": "mydb",
//!   "username": "admin",
//!   "password": "secret",
//!   "request_timeout_ms": 30000
//! }
//! ```
//!
//! Only `url` and `database` are required.

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Database names: lowercase letter first, then lowercase letters, digits
/// and any of `_$()+-/`.
const DATABASE_NAME_PATTERN: &str = r"^[a-z][a-z0-9_$()+/-]*$";

/// Connection settings for a remote database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server root URL (required)
    pub url: String,

    /// Database name (required)
    pub database: String,

    /// Basic-auth user (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password (optional)
    #[serde(default)]
    pub password: Option<String>,

    /// Round-trip timeout for one request (optional, default 30s)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl ClientConfig {
    /// Config with defaults for the optional fields.
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            username: None,
            password: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse and validate config JSON
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: ClientConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field
    pub fn validate(&self) -> ConfigResult<()> {
        let url = self.server_url()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Invalid(format!(
                "url scheme must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if !is_valid_database_name(&self.database) {
            return Err(ConfigError::Invalid(format!(
                "invalid database name: '{}'",
                self.database
            )));
        }

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be > 0".to_string(),
            ));
        }

        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::Invalid(
                "password given without username".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed server URL
    pub fn server_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.url).map_err(|e| ConfigError::Invalid(format!("url: {}", e)))
    }

    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// True if `name` is an acceptable database name.
pub fn is_valid_database_name(name: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(DATABASE_NAME_PATTERN).expect("static pattern compiles"))
        .is_match(name)
}
