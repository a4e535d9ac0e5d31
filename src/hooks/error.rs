//! Error types for hook configuration and execution.

use thiserror::Error;

use crate::secret::SecretError;
use crate::template::TemplateError;
use crate::webhook::HeaderError;

/// Error raised while decoding, encoding or updating hook configurations.
#[derive(Debug, Error)]
pub enum HookError {
    /// A stored payload does not match the schema of its kind.
    #[error("Invalid configuration for hook kind '{kind}': {source}")]
    Decode {
        /// Hook kind the payload was stored under
        kind: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A configuration could not be turned into its stored payload.
    #[error("Failed to encode configuration of hook kind '{kind}': {source}")]
    Encode {
        /// Hook kind
        kind: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A handler received a configuration of a different kind.
    #[error("Handler for '{expected}' cannot process configuration of kind '{actual}'")]
    KindMismatch {
        /// Kind the handler processes
        expected: String,
        /// Kind of the given configuration
        actual: String,
    },

    /// A concealed value could not be encrypted.
    #[error(transparent)]
    Secret(#[from] SecretError),
}

/// Error raised while building or running the executor of a single hook.
///
/// Aborts that hook only; the trigger logs it and moves on.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The URL template could not be compiled or its environment built.
    #[error("URL template error: {0}")]
    Template(#[from] TemplateError),

    /// A header value could not be computed.
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    /// The payload could not be converted to JSON.
    #[error("Failed to serialize payload: {0}")]
    Payload(#[source] serde_json::Error),

    /// The configuration handed to the handler was of the wrong kind.
    #[error(transparent)]
    Configuration(#[from] HookError),
}
