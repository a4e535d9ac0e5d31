//! Fires the configured hooks for a push event.

use std::fmt;
use std::sync::Arc;

use crate::context::WebhookContext;
use crate::hooks::{DispatchError, HookEntry, HookHandler, NoopHandler};
use crate::repository::{Changeset, PushEvent, Repository};
use crate::store::ConfigurationStore;

/// Counts of what happened to the hooks of one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerSummary {
    /// Hooks whose executor ran to completion
    pub executed: usize,
    /// Hooks not run (repository unsupported or no handler)
    pub skipped: usize,
    /// Hooks aborted with an error
    pub failed: usize,
}

impl TriggerSummary {
    /// Returns the number of hooks considered.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.executed + self.skipped + self.failed
    }
}

impl fmt::Display for TriggerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} executed, {} skipped, {} failed",
            self.executed, self.skipped, self.failed
        )
    }
}

/// Runs every hook that applies to a pushed repository.
///
/// Hooks run one after another in merged order. A failing hook is logged and
/// does not stop the others.
#[derive(Debug)]
pub struct WebhookTrigger<S> {
    context: Arc<WebhookContext<S>>,
}

impl<S: ConfigurationStore> WebhookTrigger<S> {
    /// Creates a trigger reading its configuration from `context`.
    #[must_use]
    pub const fn new(context: Arc<WebhookContext<S>>) -> Self {
        Self { context }
    }

    /// Handles one push event.
    pub async fn handle(&self, event: &PushEvent) -> TriggerSummary {
        let mut summary = TriggerSummary::default();

        let Some(repository) = &event.repository else {
            tracing::error!("received push event without repository");
            return summary;
        };

        let configuration = self.context.merged(repository);
        if !configuration.is_available() {
            tracing::debug!(
                "no webhooks configured for repository {}",
                repository.display_name()
            );
            return summary;
        }

        let changesets = event.changesets.as_deref();
        let registry = self.context.registry();

        for entry in &configuration {
            let handler = registry.resolve(entry.configuration());

            if !handler.supports_repository(repository) {
                tracing::trace!(
                    "webhook {} does not support repository {}",
                    entry.kind(),
                    repository.display_name()
                );
                summary.skipped += 1;
                continue;
            }

            let routed = handler.kind() != NoopHandler::KIND;
            match run(handler.as_ref(), entry, repository, changesets).await {
                Ok(()) if routed => summary.executed += 1,
                Ok(()) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!(
                        "webhook {} ({}) failed for repository {}: {e}",
                        entry.kind(),
                        entry.id(),
                        repository.display_name()
                    );
                    summary.failed += 1;
                }
            }
        }

        tracing::debug!(
            "webhooks for repository {}: {summary}",
            repository.display_name()
        );
        summary
    }
}

async fn run(
    handler: &dyn HookHandler,
    entry: &HookEntry,
    repository: &Repository,
    changesets: Option<&[Changeset]>,
) -> Result<(), DispatchError> {
    let executor = handler.create_executor(entry.configuration(), repository, changesets)?;
    executor.execute().await
}
