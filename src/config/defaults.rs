//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::path::PathBuf;
use std::time::Duration;

use crate::webhook::ClientOptions;

/// Default request timeout in seconds (20 minutes).
pub const TIMEOUT_SECS: u64 = ClientOptions::DEFAULT_TIMEOUT.as_secs();

/// Default connect timeout in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = ClientOptions::DEFAULT_CONNECT_TIMEOUT.as_secs();

/// Directory name below the platform data directory.
pub const STORE_DIR_NAME: &str = "push-hooks";

/// Default request timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}

/// Default connect timeout as Duration.
#[must_use]
pub const fn connect_timeout() -> Duration {
    Duration::from_secs(CONNECT_TIMEOUT_SECS)
}

/// Default store directory: `<data dir>/push-hooks`, or `./push-hooks` if
/// the platform has no data directory.
#[must_use]
pub fn store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STORE_DIR_NAME)
}
