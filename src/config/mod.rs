//! Configuration layer for push-hooks.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`], [`HooksCommand`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//!    (the secret key may also come from `PUSH_HOOKS_SECRET_KEY`)
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! The secret key has no default; `init` generates one.
//!
//! # TOML-Only Options
//!
//! - `http.connect_timeout` (default: 30s)
//! - the whole `[proxy]` section
//!
//! Hook definitions themselves are not part of this file. They live in the
//! hook store and are edited with `hooks apply`.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{Cli, Command, HooksCommand};
pub use error::{ConfigError, field};
pub use toml::{ProxySection, TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
