//! File-based hook document storage.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ConfigurationStore, LoadResult, Scope, StoreError, StoredHook};

/// Current document format version.
///
/// Documents with another version are reported as corrupted.
const DOCUMENT_VERSION: u32 = 1;

/// File name of the global document.
const GLOBAL_FILE: &str = "global.json";

/// Directory holding the per-repository documents.
const REPOSITORY_DIR: &str = "repositories";

/// On-disk document format.
#[derive(Debug, Serialize, Deserialize)]
struct HookDocument {
    /// Format version.
    version: u32,

    /// The configured hooks, in order.
    #[serde(default)]
    webhooks: Vec<StoredHook>,
}

/// File-based implementation of [`ConfigurationStore`].
///
/// Layout below the store directory:
/// - `global.json`
/// - `repositories/<repository-id>.json`
///
/// # Atomic Writes
///
/// Uses write-to-temp-then-rename pattern to prevent corruption:
/// 1. Write to `{path}.tmp`
/// 2. Rename `{path}.tmp` to `{path}`
#[derive(Debug, Clone)]
pub struct FileConfigurationStore {
    dir: PathBuf,
}

impl FileConfigurationStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the document path for `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRepositoryId`] if the id is empty or
    /// could escape the store directory.
    pub fn path_for(&self, scope: &Scope) -> Result<PathBuf, StoreError> {
        match scope {
            Scope::Global => Ok(self.dir.join(GLOBAL_FILE)),
            Scope::Repository(id) => {
                if id.is_empty()
                    || id.starts_with('.')
                    || id.contains(['/', '\\'])
                    || id.chars().any(char::is_control)
                {
                    return Err(StoreError::InvalidRepositoryId(id.clone()));
                }
                Ok(self.dir.join(REPOSITORY_DIR).join(format!("{id}.json")))
            }
        }
    }

    /// Performs the blocking save operation.
    ///
    /// Separated out so it can be wrapped in `spawn_blocking`.
    fn save_blocking(path: &Path, document: &HookDocument) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(document).map_err(StoreError::Serialize)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::Write)?;
            }
        }

        // global.json -> global.json.tmp
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));

        std::fs::write(&temp_path, content).map_err(StoreError::Write)?;
        std::fs::rename(&temp_path, path).map_err(StoreError::Write)?;

        Ok(())
    }
}

impl ConfigurationStore for FileConfigurationStore {
    fn load(&self, scope: &Scope) -> LoadResult {
        let path = match self.path_for(scope) {
            Ok(path) => path,
            Err(e) => {
                return LoadResult::Corrupted {
                    reason: e.to_string(),
                };
            }
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadResult::NotFound,
            Err(e) => {
                return LoadResult::Corrupted {
                    reason: format!("Failed to read {}: {e}", path.display()),
                };
            }
        };

        match serde_json::from_str::<HookDocument>(&content) {
            Ok(document) if document.version != DOCUMENT_VERSION => LoadResult::Corrupted {
                reason: format!(
                    "Incompatible version: expected {DOCUMENT_VERSION}, got {}",
                    document.version
                ),
            },
            Ok(document) => LoadResult::Loaded(document.webhooks),
            Err(e) => LoadResult::Corrupted {
                reason: format!("Invalid JSON in {}: {e}", path.display()),
            },
        }
    }

    async fn save(&self, scope: &Scope, hooks: &[StoredHook]) -> Result<(), StoreError> {
        let path = self.path_for(scope)?;
        let document = HookDocument {
            version: DOCUMENT_VERSION,
            webhooks: hooks.to_vec(),
        };

        tracing::debug!("writing {} webhooks to {}", hooks.len(), path.display());

        // Use spawn_blocking to avoid blocking the async runtime
        tokio::task::spawn_blocking(move || Self::save_blocking(&path, &document))
            .await
            .map_err(|e| StoreError::Write(io::Error::other(e)))?
    }
}
