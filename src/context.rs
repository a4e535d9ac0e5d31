//! Access to the stored hook configuration sets.

use std::sync::Arc;

use crate::hooks::{HookConfigurationSet, HookError, HookRegistry};
use crate::repository::Repository;
use crate::store::{ConfigurationStore, LoadResult, Scope, StoreError};

/// Error raised while storing a configuration set.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The set could not be encoded.
    #[error(transparent)]
    Encode(#[from] HookError),

    /// The document could not be written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Loads and stores hook configuration sets through a [`ConfigurationStore`].
///
/// Nothing is cached: every call reads the store again.
#[derive(Debug)]
pub struct WebhookContext<S> {
    store: S,
    registry: Arc<HookRegistry>,
}

impl<S: ConfigurationStore> WebhookContext<S> {
    /// Creates a context over `store`, decoding through `registry`.
    #[must_use]
    pub const fn new(store: S, registry: Arc<HookRegistry>) -> Self {
        Self { store, registry }
    }

    /// Returns the handler registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Loads the set for `scope`.
    ///
    /// Missing documents yield an empty set. Unreadable documents are
    /// logged and yield an empty set as well.
    #[must_use]
    pub fn load(&self, scope: &Scope) -> HookConfigurationSet {
        let hooks = match self.store.load(scope) {
            LoadResult::Loaded(hooks) => hooks,
            LoadResult::NotFound => return HookConfigurationSet::default(),
            LoadResult::Corrupted { reason } => {
                tracing::warn!("ignoring unreadable {scope} webhook configuration: {reason}");
                return HookConfigurationSet::default();
            }
        };

        HookConfigurationSet::from_stored(hooks, &self.registry).unwrap_or_else(|e| {
            tracing::warn!("ignoring invalid {scope} webhook configuration: {e}");
            HookConfigurationSet::default()
        })
    }

    /// Loads the global set.
    #[must_use]
    pub fn global(&self) -> HookConfigurationSet {
        self.load(&Scope::Global)
    }

    /// Loads the set of `repository`.
    #[must_use]
    pub fn repository(&self, repository: &Repository) -> HookConfigurationSet {
        self.load(&Scope::Repository(repository.id.clone()))
    }

    /// Global hooks followed by the hooks of `repository`.
    #[must_use]
    pub fn merged(&self, repository: &Repository) -> HookConfigurationSet {
        HookConfigurationSet::merge(self.global(), self.repository(repository))
    }

    /// Stores `set` as the document for `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError`] if the set cannot be encoded or written.
    pub async fn save(&self, scope: &Scope, set: &HookConfigurationSet) -> Result<(), SaveError> {
        let hooks = set.to_stored()?;
        self.store.save(scope, &hooks).await?;
        tracing::info!("stored {} webhooks for {scope}", hooks.len());
        Ok(())
    }
}
