//! Process-level glue for the `push-hooks` binary: exit statuses, hints
//! for a broken configuration, and log output.

use push_hooks::config::{ConfigError, field};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Process exit statuses.
pub mod exit_code {
    use std::process::ExitCode;

    /// The command finished.
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// The configuration could not be loaded, or `init` could not write
    /// its template.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// An input file, the hook store or the async runtime failed.
    ///
    /// `ExitCode::from` is not const, hence a function.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

const INIT_WITH_KEY: &str = "Run 'push-hooks init' to write a configuration with a fresh secret key,\n\
     or pass --secret-key / set PUSH_HOOKS_SECRET_KEY.";
const INIT_TEMPLATE: &str = "Run 'push-hooks init' to write a configuration template.";
const KEY_FORMAT: &str = "Secret keys are 32 random bytes, base64-encoded.";

/// Returns the follow-up advice for a configuration error, if there is any.
fn config_hint(error: &ConfigError) -> Option<&'static str> {
    match error {
        ConfigError::MissingRequired { field: f, .. } if *f == field::SECRET_KEY => {
            Some(INIT_WITH_KEY)
        }
        ConfigError::FileRead { .. } => Some(INIT_TEMPLATE),
        ConfigError::InvalidSecretKey(_) => Some(KEY_FORMAT),
        _ => None,
    }
}

/// Prints advice for `error` to stderr.
pub fn print_config_hint(error: &ConfigError) {
    if let Some(hint) = config_hint(error) {
        eprintln!("\n{hint}");
    }
}

/// Installs the log subscriber.
///
/// `RUST_LOG` wins over `--verbose`; delivery results are logged at INFO.
pub fn setup_tracing(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();
}
