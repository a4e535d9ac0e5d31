//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// push-hooks: webhooks for repository pushes
///
/// Resolves the hooks configured for a repository, renders their URL
/// templates from the pushed commits and calls them.
#[derive(Debug, Parser)]
#[command(name = "push-hooks")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the hook configuration documents
    #[arg(long = "store-dir", global = true)]
    pub store_dir: Option<PathBuf>,

    /// User-Agent sent with every webhook request
    #[arg(long = "user-agent", global = true)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Base64 key (32 bytes) used to encrypt concealed header values
    #[arg(
        long = "secret-key",
        env = "PUSH_HOOKS_SECRET_KEY",
        hide_env_values = true,
        global = true
    )]
    pub secret_key: Option<String>,

    /// Test mode - log webhook requests without sending them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for push-hooks
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file with a fresh secret key
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "push-hooks.toml")]
        output: PathBuf,
    },

    /// Fire the configured hooks for a push event read from a JSON file
    Trigger {
        /// Path to the push event document
        #[arg(long)]
        event: PathBuf,
    },

    /// Inspect or edit stored hook configurations
    #[command(subcommand)]
    Hooks(HooksCommand),
}

/// Subcommands of `hooks`
#[derive(Debug, Subcommand)]
pub enum HooksCommand {
    /// Print a hook configuration set with secrets masked
    List {
        /// Repository id (global hooks if omitted)
        #[arg(long)]
        repository: Option<String>,

        /// Only print hooks of this kind
        #[arg(long)]
        kind: Option<String>,
    },

    /// Replace a hook configuration set with the hooks from a JSON file
    Apply {
        /// Repository id (global hooks if omitted)
        #[arg(long)]
        repository: Option<String>,

        /// JSON file with the new hooks
        #[arg(long)]
        file: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}
