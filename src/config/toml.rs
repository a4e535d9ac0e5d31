//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Hook store section
    #[serde(default)]
    pub store: StoreSection,

    /// Outbound HTTP section
    #[serde(default)]
    pub http: HttpSection,

    /// Outbound proxy (disabled if absent)
    pub proxy: Option<ProxySection>,

    /// Secret handling section
    #[serde(default)]
    pub secrets: SecretsSection,
}

/// Hook store section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// Directory holding `global.json` and `repositories/`
    pub dir: Option<PathBuf>,
}

/// Outbound HTTP section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    /// User-Agent header value
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    pub timeout: Option<u64>,

    /// Connect timeout in seconds
    pub connect_timeout: Option<u64>,
}

/// Outbound proxy section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxySection {
    /// Proxy host name
    pub server: String,

    /// Proxy port
    pub port: u16,

    /// Proxy user
    pub user: Option<String>,

    /// Proxy password
    pub password: Option<String>,

    /// Hosts that bypass the proxy
    #[serde(default)]
    pub excludes: Vec<String>,
}

/// Secret handling section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretsSection {
    /// Base64 key for concealed header values
    pub key: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
///
/// `secret_key` is written uncommented so the file works as is.
#[must_use]
pub fn default_config_template(secret_key: &str) -> String {
    format!(
        r#"# push-hooks Configuration File

[store]
# Directory holding global.json and repositories/<id>.json
# (default: <platform data dir>/push-hooks)
# dir = "/var/lib/push-hooks"

[http]
# User-Agent sent with every webhook request (default: push-hooks/<version>)
# user_agent = "push-hooks"

# Request timeout in seconds (default: 1200)
# timeout = 1200

# Connect timeout in seconds (default: 30)
# connect_timeout = 30

# Outbound proxy; remove the comments to enable
# [proxy]
# server = "proxy.example.com"
# port = 3128
# user = "proxy-user"
# password = "proxy-password"
# excludes = ["localhost", "ci.internal"]

[secrets]
# Base64 key (32 bytes) used to encrypt concealed header values.
# Can also be set via PUSH_HOOKS_SECRET_KEY or --secret-key.
# Changing it makes stored secrets unreadable.
key = "{secret_key}"
"#
    )
}
