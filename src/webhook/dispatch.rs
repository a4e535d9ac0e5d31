//! Request building and response classification for webhook calls.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};

use super::marshaller::{JsonMarshaller, PayloadMarshaller};
use super::{ExecutionHeader, HeaderError, HttpClient, HttpError, HttpRequest};

/// Default `User-Agent` sent with every webhook request.
pub const DEFAULT_USER_AGENT: &str = concat!("push-hooks/", env!("CARGO_PKG_VERSION"));

/// Outcome of a webhook request that reached the point of sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The endpoint answered with a 2xx status.
    Success(http::StatusCode),
    /// The endpoint answered with any other status.
    Failure(http::StatusCode),
    /// Dry-run mode: the request was built and logged only.
    DryRun,
}

impl Delivery {
    /// Returns true for a 2xx answer.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Classifies a response status: 200 to 299 is a success.
#[must_use]
pub fn classify(status: http::StatusCode) -> Delivery {
    if (200..300).contains(&status.as_u16()) {
        Delivery::Success(status)
    } else {
        Delivery::Failure(status)
    }
}

/// Builds webhook requests and sends them through an [`HttpClient`].
pub struct WebhookHttpClient<H> {
    client: H,
    marshaller: Arc<dyn PayloadMarshaller>,
    user_agent: String,
    dry_run: bool,
}

impl<H> WebhookHttpClient<H> {
    /// Creates a dispatch client with the JSON marshaller and default user agent.
    #[must_use]
    pub fn new(client: H) -> Self {
        Self {
            client,
            marshaller: Arc::new(JsonMarshaller),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            dry_run: false,
        }
    }

    /// Replaces the payload marshaller.
    #[must_use]
    pub fn with_marshaller(mut self, marshaller: Arc<dyn PayloadMarshaller>) -> Self {
        self.marshaller = marshaller;
        self
    }

    /// Sets the `User-Agent` header value.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enables dry-run mode: requests are built and logged but not sent.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the configured user agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns true in dry-run mode.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Builds a request for `url`.
    ///
    /// User info in the URL is moved into a basic `Authorization` header.
    /// The payload is serialized only when present and the method is POST
    /// or PUT; other methods are sent without body. `payload_type`
    /// overrides the marshaller's content type, and a string payload with
    /// a non-JSON type is sent as-is.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if `url` does not parse, or
    /// [`HttpError::Payload`] if the payload cannot be serialized.
    pub fn build(
        &self,
        method: http::Method,
        url: &str,
        payload: Option<&serde_json::Value>,
        payload_type: Option<&str>,
    ) -> Result<WebhookRequest<'_, H>, HttpError> {
        // The raw URL may carry credentials, so only the parse error is reported.
        let mut url = url::Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        let authorization = take_credentials(&mut url);

        let payload = if carries_body(&method) {
            payload
        } else {
            if payload.is_some() {
                tracing::debug!("dropping payload of {method} request");
            }
            None
        };

        let mut request = HttpRequest::new(method, url);

        if let Some(value) = authorization {
            request.set_header(AUTHORIZATION, value);
        }

        let user_agent = http::HeaderValue::try_from(self.user_agent.as_str())
            .map_err(|e| HttpError::Client(Box::new(e)))?;
        request.set_header(USER_AGENT, user_agent);

        if let Some(payload) = payload {
            let (body, content_type) = self.marshal(payload, payload_type)?;
            let content_type = http::HeaderValue::try_from(content_type)
                .map_err(|e| HttpError::Client(Box::new(e)))?;
            request.set_header(CONTENT_TYPE, content_type);
            request.body = Some(body);
        }

        Ok(WebhookRequest {
            owner: self,
            request,
        })
    }

    fn marshal(
        &self,
        payload: &serde_json::Value,
        payload_type: Option<&str>,
    ) -> Result<(Vec<u8>, String), HttpError> {
        match (payload, payload_type) {
            (serde_json::Value::String(raw), Some(media_type)) if !is_json(media_type) => {
                Ok((raw.clone().into_bytes(), media_type.to_string()))
            }
            (_, media_type) => {
                let body = self.marshaller.marshal(payload)?;
                let content_type = media_type.unwrap_or_else(|| self.marshaller.content_type());
                Ok((body, content_type.to_string()))
            }
        }
    }
}

impl<H: HttpClient> WebhookHttpClient<H> {
    /// Builds and sends a request without extra headers.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build) and [`WebhookRequest::execute`].
    pub async fn execute(
        &self,
        method: http::Method,
        url: &str,
        payload: Option<&serde_json::Value>,
    ) -> Result<Delivery, HttpError> {
        self.build(method, url, payload, None)?.execute().await
    }
}

impl<H> fmt::Debug for WebhookHttpClient<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookHttpClient")
            .field("content_type", &self.marshaller.content_type())
            .field("user_agent", &self.user_agent)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

/// A built request ready to receive headers and be sent.
pub struct WebhookRequest<'a, H> {
    owner: &'a WebhookHttpClient<H>,
    request: HttpRequest,
}

impl<H> WebhookRequest<'_, H> {
    /// Adds execution headers.
    ///
    /// Content headers receive the serialized body (or `None` without one).
    ///
    /// # Errors
    ///
    /// Returns the first [`HeaderError`]; nothing is sent in that case.
    pub fn headers(mut self, headers: &[ExecutionHeader]) -> Result<Self, HeaderError> {
        for header in headers {
            let (name, value) = header.resolve(self.request.body.as_deref())?;
            self.request.set_header(name, value);
        }
        Ok(self)
    }

    /// Lets the caller adjust the request.
    #[must_use]
    pub fn prepare(mut self, prepare: impl FnOnce(&mut HttpRequest)) -> Self {
        prepare(&mut self.request);
        self
    }

    /// Returns the request as built so far.
    #[must_use]
    pub const fn request(&self) -> &HttpRequest {
        &self.request
    }
}

impl<H: HttpClient> WebhookRequest<'_, H> {
    /// Sends the request and classifies the answer.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the transport fails. Non-2xx answers are not
    /// errors; they are returned as [`Delivery::Failure`].
    pub async fn execute(self) -> Result<Delivery, HttpError> {
        let url = self.request.url.to_string();

        if self.owner.dry_run {
            tracing::info!(
                "dry run: {} {url} ({} bytes)",
                self.request.method,
                self.request.body_len()
            );
            return Ok(Delivery::DryRun);
        }

        tracing::debug!("sending {} request to {url}", self.request.method);
        let response = self.owner.client.request(self.request).await?;

        let delivery = classify(response.status);
        match delivery {
            Delivery::Success(status) => {
                tracing::info!("webhook {url} ended successfully with status code: {}", status.as_u16());
            }
            Delivery::Failure(status) => {
                tracing::warn!("webhook {url} failed with statusCode: {}", status.as_u16());
            }
            Delivery::DryRun => {}
        }

        Ok(delivery)
    }
}

impl<H> fmt::Debug for WebhookRequest<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookRequest")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

fn carries_body(method: &http::Method) -> bool {
    *method == http::Method::POST || *method == http::Method::PUT
}

fn is_json(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Strips user info from `url` and returns a basic authorization value.
fn take_credentials(url: &mut url::Url) -> Option<http::HeaderValue> {
    let user = url.username().to_string();
    let password = url.password().map(ToString::to_string);

    if user.is_empty() && password.is_none() {
        return None;
    }

    // Both setters only fail for URLs that cannot carry credentials.
    let _ = url.set_username("");
    let _ = url.set_password(None);

    let Some(password) = password else {
        tracing::warn!("found malformed credentials in url {url}, ignoring them");
        return None;
    };

    let token = STANDARD.encode(format!("{user}:{password}"));

    let mut value = http::HeaderValue::try_from(format!("Basic {token}")).ok()?;
    value.set_sensitive(true);
    Some(value)
}
