//! Sends webhook executions and logs their outcome.

use std::sync::Arc;

use super::dispatch::{Delivery, WebhookHttpClient};
use super::execution::WebhookExecution;
use super::{HeaderError, HttpClient};

/// Sends [`WebhookExecution`]s.
///
/// Failed deliveries are logged and dropped; there are no retries. Only
/// header failures reach the caller, since they mean the hook itself is
/// broken rather than the endpoint.
///
/// # Example
///
/// ```
/// use push_hooks::webhook::{ReqwestClient, WebhookHttpClient, WebhookSender};
///
/// let sender = WebhookSender::new(WebhookHttpClient::new(ReqwestClient::new()));
/// assert!(!sender.client().is_dry_run());
/// ```
#[derive(Debug)]
pub struct WebhookSender<H> {
    client: Arc<WebhookHttpClient<H>>,
}

impl<H> Clone for WebhookSender<H> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<H> WebhookSender<H> {
    /// Creates a sender on top of a dispatch client.
    #[must_use]
    pub fn new(client: WebhookHttpClient<H>) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Returns the dispatch client.
    #[must_use]
    pub fn client(&self) -> &WebhookHttpClient<H> {
        &self.client
    }
}

impl<H: HttpClient> WebhookSender<H> {
    /// Sends one execution.
    ///
    /// Returns `Ok(None)` if the request could not be built or the transport
    /// failed; both cases are logged here.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] if a header value could not be computed. The
    /// request is not sent in that case.
    pub async fn send(&self, execution: WebhookExecution) -> Result<Option<Delivery>, HeaderError> {
        let parts = execution.into_parts();
        let method = parts.method.resolve(parts.payload.is_some());
        tracing::debug!("using http method {method} for webhook request");

        let request = match self.client.build(
            method,
            &parts.url,
            parts.payload.as_ref(),
            parts.payload_type.as_deref(),
        ) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!("failed to build webhook request: {e}");
                return Ok(None);
            }
        };

        let mut request = request.headers(&parts.headers)?;
        if let Some(prepare) = parts.prepare {
            request = request.prepare(prepare);
        }

        let url = request.request().url.clone();
        match request.execute().await {
            Ok(delivery) => Ok(Some(delivery)),
            Err(e) => {
                tracing::error!("failed to execute webhook {url}: {e}");
                Ok(None)
            }
        }
    }
}
