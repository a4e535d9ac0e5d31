//! Persistence of hook configuration documents.
//!
//! One document holds the global hooks, and one document per repository
//! holds that repository's hooks. Documents are loaded fresh on every use.

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileConfigurationStore;

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A hook entry as it appears in a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredHook {
    /// Entry id (empty until assigned)
    #[serde(default)]
    pub id: String,
    /// Kind name of the configuration
    pub name: String,
    /// Kind-specific configuration payload
    #[serde(default)]
    pub configuration: serde_json::Value,
}

/// Which document to address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Hooks that apply to every repository.
    Global,
    /// Hooks of the repository with the given id.
    Repository(String),
}

impl Scope {
    /// Returns the scope for `repository_id`, or [`Scope::Global`] for `None`.
    #[must_use]
    pub fn from_repository(repository_id: Option<&str>) -> Self {
        repository_id.map_or(Self::Global, |id| Self::Repository(id.to_string()))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Repository(id) => write!(f, "repository {id}"),
        }
    }
}

/// Result of loading a document.
///
/// Explicitly models all valid states to avoid ambiguity:
/// - Successfully loaded hooks
/// - No document exists yet
/// - Document exists but is corrupted/unreadable
#[derive(Debug, Clone)]
pub enum LoadResult {
    /// Successfully loaded hooks.
    Loaded(Vec<StoredHook>),

    /// No document exists (nothing configured yet).
    NotFound,

    /// Document exists but could not be parsed.
    /// Callers continue without hooks; the next save overwrites it.
    Corrupted {
        /// Reason for corruption (for logging/debugging).
        reason: String,
    },
}

impl LoadResult {
    /// Returns the loaded hooks, or an empty vec for `NotFound`/`Corrupted`.
    #[must_use]
    pub fn into_hooks(self) -> Vec<StoredHook> {
        match self {
            Self::Loaded(hooks) => hooks,
            Self::NotFound | Self::Corrupted { .. } => Vec::new(),
        }
    }

    /// Returns `true` if a document was successfully loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Errors that can occur while writing documents.
///
/// Only covers write-side errors; read-side issues are modeled
/// as [`LoadResult`] variants to allow graceful degradation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to write the document.
    #[error("Failed to write hook document: {0}")]
    Write(#[source] io::Error),

    /// Failed to serialize the document.
    #[error("Failed to serialize hook document: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The repository id cannot be used as a file name.
    #[error("Invalid repository id: '{0}'")]
    InvalidRepositoryId(String),
}

/// Abstraction for persisting hook documents.
///
/// Implementations should:
/// - Use atomic writes to prevent corruption from crashes
/// - Handle missing documents gracefully (return `LoadResult::NotFound`)
/// - Degrade gracefully on read errors (return `LoadResult::Corrupted`)
///
/// # Testing
///
/// Use [`mock::MockConfigurationStore`] in tests to avoid filesystem dependencies.
pub trait ConfigurationStore: Send + Sync {
    /// Loads the document for `scope`.
    fn load(&self, scope: &Scope) -> LoadResult;

    /// Replaces the document for `scope`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    fn save(
        &self,
        scope: &Scope,
        hooks: &[StoredHook],
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Mock store for testing.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// In-memory [`ConfigurationStore`] with injectable load results.
    #[derive(Debug, Default)]
    pub struct MockConfigurationStore {
        documents: RwLock<HashMap<Scope, LoadResult>>,
        saves: RwLock<Vec<(Scope, Vec<StoredHook>)>>,
    }

    impl MockConfigurationStore {
        /// Creates an empty store (every scope is `NotFound`).
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Sets the load result for `scope`.
        #[must_use]
        pub fn with(self, scope: Scope, result: LoadResult) -> Self {
            self.documents.write().unwrap().insert(scope, result);
            self
        }

        /// Sets loaded hooks for `scope`.
        #[must_use]
        pub fn with_hooks(self, scope: Scope, hooks: Vec<StoredHook>) -> Self {
            self.with(scope, LoadResult::Loaded(hooks))
        }

        /// Returns every save in order.
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned (only in test code).
        #[must_use]
        pub fn saves(&self) -> Vec<(Scope, Vec<StoredHook>)> {
            self.saves.read().unwrap().clone()
        }
    }

    impl ConfigurationStore for MockConfigurationStore {
        fn load(&self, scope: &Scope) -> LoadResult {
            self.documents
                .read()
                .unwrap()
                .get(scope)
                .cloned()
                .unwrap_or(LoadResult::NotFound)
        }

        async fn save(&self, scope: &Scope, hooks: &[StoredHook]) -> Result<(), StoreError> {
            self.saves
                .write()
                .unwrap()
                .push((scope.clone(), hooks.to_vec()));
            self.documents
                .write()
                .unwrap()
                .insert(scope.clone(), LoadResult::Loaded(hooks.to_vec()));
            Ok(())
        }
    }
}
