//! Transport-level request and response values and the client seam.

use super::HttpError;

/// A fully built outbound webhook call.
///
/// Header values marked sensitive (credentials, concealed headers) are
/// hidden by the `Debug` output of [`http::HeaderMap`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: http::Method,
    /// Target URL, without user-info
    pub url: url::Url,
    /// Request headers
    pub headers: http::HeaderMap,
    /// Serialized payload, if any
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: url::Url) -> Self {
        Self::new(http::Method::GET, url)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(url: url::Url) -> Self {
        Self::new(http::Method::POST, url)
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a header value, keeping earlier values of the same name.
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets a header, replacing every earlier value of the same name.
    pub fn set_header(&mut self, name: http::HeaderName, value: http::HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Returns the body size in bytes (0 without body).
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }
}

/// The answer to a webhook call.
///
/// Only the status drives classification; the body is kept for logging.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: http::StatusCode,
    /// Buffered body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(status: http::StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Creates a response with an empty body.
    #[must_use]
    pub const fn with_status(status: http::StatusCode) -> Self {
        Self::new(status, Vec::new())
    }

    /// Returns true for 2xx status codes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the body as text, if it is valid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Sends [`HttpRequest`]s.
///
/// [`ReqwestClient`](super::ReqwestClient) is the production implementation;
/// tests substitute a recording mock.
///
/// ```ignore
/// use push_hooks::webhook::{HttpClient, HttpError, HttpRequest, HttpResponse};
///
/// struct Accepting;
///
/// impl HttpClient for Accepting {
///     async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
///         Ok(HttpResponse::with_status(http::StatusCode::ACCEPTED))
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Sends `req` and buffers the response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Connection`] or [`HttpError::Timeout`] if no
    /// response arrives, and [`HttpError::InvalidUrl`] if the client rejects
    /// the URL. A non-2xx status is not an error.
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send;
}
