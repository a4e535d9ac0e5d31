//! Reconciles an edited hook configuration set with the stored one.

use std::sync::Arc;

use super::HookError;
use super::config::HookConfigurationSet;
use super::registry::HookRegistry;

/// Prepares edited configuration sets for storage.
#[derive(Debug, Clone)]
pub struct ConfigurationUpdater {
    registry: Arc<HookRegistry>,
}

impl ConfigurationUpdater {
    /// Creates an updater routing through `registry`.
    #[must_use]
    pub const fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Prepares `new` for storage, given the currently stored `old`.
    ///
    /// Every entry without id gets a fresh UUID. Freshly entered secrets
    /// are encrypted, and masked secrets are restored from the entry with
    /// the same id in `old`, if there is one.
    ///
    /// # Errors
    ///
    /// Returns the first [`HookError`] raised by a handler.
    pub fn update(
        &self,
        old: &HookConfigurationSet,
        mut new: HookConfigurationSet,
    ) -> Result<HookConfigurationSet, HookError> {
        for entry in new.entries_mut() {
            if entry.id().is_empty() {
                let id = uuid::Uuid::new_v4().to_string();
                tracing::debug!("assigned id {id} to new webhook of kind {}", entry.kind());
                entry.set_id(id);
            }

            let handler = self.registry.resolve(entry.configuration());
            handler.protect_secrets(entry.configuration_mut())?;

            if let Some(previous) = old.find(entry.id()) {
                if handler.accepts(previous.configuration()) {
                    handler
                        .update_before_store(previous.configuration(), entry.configuration_mut())?;
                }
            }
        }
        Ok(new)
    }

    /// Returns a copy of `set` with secrets masked for display.
    #[must_use]
    pub fn masked(&self, set: &HookConfigurationSet) -> HookConfigurationSet {
        let mut masked = set.clone();
        for entry in masked.entries_mut() {
            let handler = self.registry.resolve(entry.configuration());
            handler.mask_secrets(entry.configuration_mut());
        }
        masked
    }
}
