//! Handlers for hook kinds and the registry that routes to them.

use std::sync::Arc;

use async_trait::async_trait;

use crate::repository::{Changeset, Repository};

use super::config::{HookConfiguration, UnknownHook};
use super::{DispatchError, HookError};

/// Runs one hook for one push.
#[async_trait]
pub trait HookExecutor: Send + Sync {
    /// Performs the hook's HTTP calls.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the hook aborts, e.g. because a header
    /// value cannot be computed. Delivery failures are not errors.
    async fn execute(&self) -> Result<(), DispatchError>;
}

/// Code that knows how to handle one hook kind.
///
/// Registered in a [`HookRegistry`]; the registry picks the first handler
/// whose [`accepts`](Self::accepts) returns true for a configuration.
pub trait HookHandler: Send + Sync {
    /// Kind name this handler processes.
    fn kind(&self) -> &str;

    /// Returns true if this handler can process `config`.
    fn accepts(&self, config: &dyn HookConfiguration) -> bool;

    /// Returns true if hooks of this kind may fire for `repository`.
    fn supports_repository(&self, _repository: &Repository) -> bool {
        true
    }

    /// Decodes a stored payload of this handler's kind.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Decode`] if the payload is malformed.
    fn decode(&self, payload: serde_json::Value) -> Result<Box<dyn HookConfiguration>, HookError>;

    /// Builds the executor for one push.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the executor cannot be built, e.g. when
    /// the URL template does not compile.
    fn create_executor(
        &self,
        config: &dyn HookConfiguration,
        repository: &Repository,
        changesets: Option<&[Changeset]>,
    ) -> Result<Box<dyn HookExecutor>, DispatchError>;

    /// Encrypts freshly entered secrets before the configuration is stored.
    ///
    /// # Errors
    ///
    /// Returns [`HookError`] if a secret cannot be encrypted.
    fn protect_secrets(&self, _config: &mut dyn HookConfiguration) -> Result<(), HookError> {
        Ok(())
    }

    /// Carries state over from the previously stored version of an entry.
    ///
    /// Only called when an entry with the same id was stored before.
    ///
    /// # Errors
    ///
    /// Returns [`HookError`] if the configurations cannot be reconciled.
    fn update_before_store(
        &self,
        _old: &dyn HookConfiguration,
        _new: &mut dyn HookConfiguration,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Replaces secrets with a placeholder for display.
    fn mask_secrets(&self, _config: &mut dyn HookConfiguration) {}
}

/// Routes hook configurations to their handlers.
pub struct HookRegistry {
    handlers: Vec<Arc<dyn HookHandler>>,
    fallback: Arc<dyn HookHandler>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            fallback: Arc::new(NoopHandler),
        }
    }

    /// Registers a handler.
    #[must_use]
    pub fn with_handler(mut self, handler: impl HookHandler + 'static) -> Self {
        self.register(Arc::new(handler));
        self
    }

    /// Registers a shared handler.
    pub fn register(&mut self, handler: Arc<dyn HookHandler>) {
        tracing::debug!("registered webhook handler for kind {}", handler.kind());
        self.handlers.push(handler);
    }

    /// Returns the first handler that accepts `config`, or the no-op handler.
    #[must_use]
    pub fn resolve(&self, config: &dyn HookConfiguration) -> Arc<dyn HookHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.accepts(config))
            .map_or_else(|| Arc::clone(&self.fallback), Arc::clone)
    }

    /// Returns the handler registered for `kind`.
    #[must_use]
    pub fn handler_for(&self, kind: &str) -> Option<Arc<dyn HookHandler>> {
        self.handlers
            .iter()
            .find(|handler| handler.kind() == kind)
            .map(Arc::clone)
    }

    /// Decodes a stored payload.
    ///
    /// Payloads of unknown kinds are kept as [`UnknownHook`].
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Decode`] if a known kind's payload is malformed.
    pub fn decode(
        &self,
        kind: &str,
        payload: serde_json::Value,
    ) -> Result<Box<dyn HookConfiguration>, HookError> {
        match self.handler_for(kind) {
            Some(handler) => handler.decode(payload),
            None => {
                tracing::debug!("no handler for webhook kind {kind}, keeping it as is");
                Ok(Box::new(UnknownHook::new(kind, payload)))
            }
        }
    }

    /// Returns the kinds whose handler supports `repository`.
    #[must_use]
    pub fn kinds_for(&self, repository: &Repository) -> Vec<&str> {
        self.handlers
            .iter()
            .filter(|handler| handler.supports_repository(repository))
            .map(|handler| handler.kind())
            .collect()
    }

    /// Returns all registered kinds.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        self.handlers.iter().map(|handler| handler.kind()).collect()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("kinds", &self.kinds())
            .finish_non_exhaustive()
    }
}

/// Handler used when no registered handler accepts a configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl NoopHandler {
    /// Kind name reported by the no-op handler.
    pub const KIND: &'static str = "none";
}

impl HookHandler for NoopHandler {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn accepts(&self, _config: &dyn HookConfiguration) -> bool {
        true
    }

    fn decode(&self, payload: serde_json::Value) -> Result<Box<dyn HookConfiguration>, HookError> {
        Ok(Box::new(UnknownHook::new(Self::KIND, payload)))
    }

    fn create_executor(
        &self,
        config: &dyn HookConfiguration,
        _repository: &Repository,
        _changesets: Option<&[Changeset]>,
    ) -> Result<Box<dyn HookExecutor>, DispatchError> {
        Ok(Box::new(NoopExecutor {
            kind: config.kind().to_string(),
        }))
    }
}

/// Executor that only reports the missing handler.
#[derive(Debug)]
struct NoopExecutor {
    kind: String,
}

#[async_trait]
impl HookExecutor for NoopExecutor {
    async fn execute(&self) -> Result<(), DispatchError> {
        tracing::warn!("no executor found for webhook of kind {}", self.kind);
        Ok(())
    }
}
