//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::HeaderValue;

use crate::secret::AesGcmCipher;
use crate::webhook::{ClientOptions, DEFAULT_USER_AGENT, ProxySettings};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::{ProxySection, TomlConfig};

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Directory of the hook store
    pub store_dir: PathBuf,

    /// Timeouts and proxy for the HTTP client
    pub client: ClientOptions,

    /// User-Agent sent with every webhook request
    pub user_agent: String,

    /// Cipher for concealed header values
    pub cipher: AesGcmCipher,

    /// Dry-run mode (log requests without sending them)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let proxy = self
            .client
            .proxy
            .as_ref()
            .map_or_else(|| "none".to_string(), ProxySettings::url);

        write!(
            f,
            "Config {{ store: {}, user_agent: {}, timeout: {}s, connect_timeout: {}s, proxy: {}, dry_run: {} }}",
            self.store_dir.display(),
            self.user_agent,
            self.client.timeout.as_secs(),
            self.client.connect_timeout.as_secs(),
            proxy,
            self.dry_run,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The secret key is missing or unusable
    /// - A timeout is zero
    /// - The user agent is not a valid header value
    /// - The proxy section is incomplete
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let cipher = Self::resolve_cipher(cli, toml)?;
        let user_agent = Self::resolve_user_agent(cli, toml)?;

        let client = ClientOptions {
            timeout: Self::resolve_timeout(cli, toml)?,
            connect_timeout: Self::resolve_connect_timeout(toml)?,
            proxy: toml
                .and_then(|t| t.proxy.as_ref())
                .map(build_proxy)
                .transpose()?,
        };

        Ok(Self {
            store_dir: Self::resolve_store_dir(cli, toml),
            client,
            user_agent,
            cipher,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_store_dir(cli: &Cli, toml: Option<&TomlConfig>) -> PathBuf {
        cli.store_dir
            .clone()
            .or_else(|| toml.and_then(|t| t.store.dir.clone()))
            .unwrap_or_else(defaults::store_dir)
    }

    fn resolve_cipher(cli: &Cli, toml: Option<&TomlConfig>) -> Result<AesGcmCipher, ConfigError> {
        let key = cli
            .secret_key
            .as_deref()
            .or_else(|| toml.and_then(|t| t.secrets.key.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::SECRET_KEY,
                    "Use --secret-key, PUSH_HOOKS_SECRET_KEY or set secrets.key in config file",
                )
            })?;

        AesGcmCipher::from_base64(key).map_err(ConfigError::InvalidSecretKey)
    }

    fn resolve_user_agent(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let user_agent = cli
            .user_agent
            .as_deref()
            .or_else(|| toml.and_then(|t| t.http.user_agent.as_deref()))
            .unwrap_or(DEFAULT_USER_AGENT);

        HeaderValue::from_str(user_agent).map_err(|e| ConfigError::InvalidUserAgent {
            value: user_agent.to_string(),
            reason: e.to_string(),
        })?;

        Ok(user_agent.to_string())
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        let seconds = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.http.timeout))
            .unwrap_or(defaults::TIMEOUT_SECS);

        non_zero_secs("timeout", seconds)
    }

    fn resolve_connect_timeout(toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        let seconds = toml
            .and_then(|t| t.http.connect_timeout)
            .unwrap_or(defaults::CONNECT_TIMEOUT_SECS);

        non_zero_secs("connect_timeout", seconds)
    }
}

/// Writes the default configuration template, with a fresh secret key, to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template(&AesGcmCipher::generate_key());
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn non_zero_secs(field: &'static str, seconds: u64) -> Result<Duration, ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::InvalidDuration {
            field,
            reason: "must be greater than 0".to_string(),
        });
    }

    Ok(Duration::from_secs(seconds))
}

fn build_proxy(section: &ProxySection) -> Result<ProxySettings, ConfigError> {
    let server = section.server.trim();
    if server.is_empty() {
        return Err(ConfigError::InvalidProxy("server must not be empty".to_string()));
    }

    if section.port == 0 {
        return Err(ConfigError::InvalidProxy("port must be greater than 0".to_string()));
    }

    Ok(ProxySettings {
        server: server.to_string(),
        port: section.port,
        user: section.user.clone(),
        password: section.password.clone(),
        excludes: section.excludes.clone(),
    })
}
