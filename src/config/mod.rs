//! Configuration for the builderport CLI.
//!
//! TOML-backed, with serde defaults so a partial file still loads. Three
//! sections:
//!
//! - [`ServerConfig`] - builder port endpoint (host, port)
//! - [`AuthConfig`] - bearer token, or where to find one
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 9697
//!
//! [auth]
//! token_file = "/var/mud/builder.token"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Token discovery is deliberately kept out of the client core: a
//! [`crate::client::Session`] takes the token as an explicit parameter,
//! and [`discover_token`] implements the lookup chain on top.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Environment variable consulted when no explicit token is configured.
pub const TOKEN_ENV_VAR: &str = "BUILDERPORT_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: crate::client::DEFAULT_HOST.to_string(),
            port: crate::client::DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Explicit bearer token. Takes precedence over every other source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// File holding the token (contents are trimmed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Optional log file; when set, log lines are appended there.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file.
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

/// Resolve the bearer token from the configured sources, in precedence
/// order: explicit config value, `$BUILDERPORT_TOKEN`, the configured
/// token file, then the well-known `<config dir>/builderport/token`.
pub fn discover_token(auth: &AuthConfig) -> Option<String> {
    if let Some(token) = &auth.token {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    if let Some(path) = &auth.token_file {
        if let Some(token) = read_token_file(std::path::Path::new(path)) {
            return Some(token);
        }
    }

    let well_known = dirs::config_dir()?.join("builderport").join("token");
    read_token_file(&well_known)
}

fn read_token_file(path: &std::path::Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    let token = contents.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
