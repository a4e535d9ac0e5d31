//! Ad-hoc webhook calls for code outside the push trigger.

use std::sync::Arc;

use crate::context::WebhookContext;
use crate::hooks::HookConfiguration;
use crate::repository::Repository;
use crate::store::ConfigurationStore;
use crate::webhook::{HeaderError, HttpClient, WebhookExecution, WebhookSender};

/// Lets other components read hook configurations of their own kind and
/// send webhook calls through the shared sender.
#[derive(Debug)]
pub struct WebhookService<S, H> {
    context: Arc<WebhookContext<S>>,
    sender: WebhookSender<H>,
}

impl<S: ConfigurationStore, H: HttpClient> WebhookService<S, H> {
    /// Creates the service.
    #[must_use]
    pub const fn new(context: Arc<WebhookContext<S>>, sender: WebhookSender<H>) -> Self {
        Self { context, sender }
    }

    /// Returns the merged configurations of type `T` for `repository`.
    #[must_use]
    pub fn configurations<T: HookConfiguration + Clone>(&self, repository: &Repository) -> Vec<T> {
        self.context
            .merged(repository)
            .configurations::<T>()
            .cloned()
            .collect()
    }

    /// Sends one execution.
    ///
    /// Delivery failures are logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] if a header value cannot be computed.
    pub async fn submit(&self, execution: WebhookExecution) -> Result<(), HeaderError> {
        self.sender.send(execution).await.map(|_| ())
    }
}
