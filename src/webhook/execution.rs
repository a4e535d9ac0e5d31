//! Description of a single outgoing webhook call.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ExecutionHeader, HttpRequest};

/// HTTP method configured on a hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// POST when there is a payload, GET otherwise.
    #[default]
    Auto,
    /// Always GET.
    Get,
    /// Always POST.
    Post,
    /// Always PUT.
    Put,
}

impl HttpMethod {
    /// Resolves the configured method to a concrete HTTP method.
    #[must_use]
    pub const fn resolve(self, has_payload: bool) -> http::Method {
        match self {
            Self::Auto if has_payload => http::Method::POST,
            Self::Auto | Self::Get => http::Method::GET,
            Self::Post => http::Method::POST,
            Self::Put => http::Method::PUT,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "AUTO",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        })
    }
}

/// Hook for adjusting the built request before it is sent.
pub type PrepareFn = Box<dyn FnOnce(&mut HttpRequest) + Send>;

/// Everything needed to perform one webhook call.
///
/// Produced by hook executors and handed to [`WebhookSender`](super::WebhookSender).
pub struct WebhookExecution {
    method: HttpMethod,
    url: String,
    headers: Vec<ExecutionHeader>,
    payload: Option<serde_json::Value>,
    payload_type: Option<String>,
    prepare: Option<PrepareFn>,
}

impl WebhookExecution {
    /// Creates an execution without payload or headers.
    ///
    /// [`HttpMethod::Auto`] is resolved when the execution is sent.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            payload: None,
            payload_type: None,
            prepare: None,
        }
    }

    /// Sets the request payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Overrides the payload media type.
    #[must_use]
    pub fn with_payload_type(mut self, payload_type: impl Into<String>) -> Self {
        self.payload_type = Some(payload_type.into());
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, header: ExecutionHeader) -> Self {
        self.headers.push(header);
        self
    }

    /// Appends several headers.
    #[must_use]
    pub fn with_headers(mut self, headers: impl IntoIterator<Item = ExecutionHeader>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Registers a callback that may adjust the request before sending.
    #[must_use]
    pub fn with_prepare<F>(mut self, prepare: F) -> Self
    where
        F: FnOnce(&mut HttpRequest) + Send + 'static,
    {
        self.prepare = Some(Box::new(prepare));
        self
    }

    /// Returns the configured method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the rendered URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &[ExecutionHeader] {
        &self.headers
    }

    /// Returns the payload, if any.
    #[must_use]
    pub const fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    /// Returns the payload media type override, if any.
    #[must_use]
    pub fn payload_type(&self) -> Option<&str> {
        self.payload_type.as_deref()
    }

    pub(crate) fn into_parts(self) -> ExecutionParts {
        ExecutionParts {
            method: self.method,
            url: self.url,
            headers: self.headers,
            payload: self.payload,
            payload_type: self.payload_type,
            prepare: self.prepare,
        }
    }
}

impl fmt::Debug for WebhookExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookExecution")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("has_payload", &self.payload.is_some())
            .field("payload_type", &self.payload_type)
            .field("has_prepare", &self.prepare.is_some())
            .finish()
    }
}

/// Owned pieces of a [`WebhookExecution`].
pub(crate) struct ExecutionParts {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<ExecutionHeader>,
    pub payload: Option<serde_json::Value>,
    pub payload_type: Option<String>,
    pub prepare: Option<PrepareFn>,
}
