//! Production HTTP client implementation using reqwest.

use std::time::Duration;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Outbound proxy settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    /// Proxy host name
    pub server: String,
    /// Proxy port
    pub port: u16,
    /// Optional proxy user for basic authentication
    pub user: Option<String>,
    /// Optional proxy password for basic authentication
    pub password: Option<String>,
    /// Hosts that bypass the proxy
    pub excludes: Vec<String>,
}

impl ProxySettings {
    /// Returns the proxy URL in `http://host:port` form.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.server, self.port)
    }
}

/// Connection settings applied when building the underlying client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Total request timeout
    pub timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// Optional outbound proxy
    pub proxy: Option<ProxySettings>,
}

impl ClientOptions {
    /// Default request timeout (20 minutes; slow CI endpoints are common).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1200);

    /// Default connect timeout (30 seconds).
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            proxy: None,
        }
    }
}

/// Production HTTP client using reqwest.
///
/// This is a thin wrapper around `reqwest::Client` that implements
/// the [`HttpClient`] trait.
///
/// # Example
///
/// ```no_run
/// use push_hooks::webhook::{ReqwestClient, HttpClient, HttpRequest};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::new();
/// let url = Url::parse("https://ci.example.com/hook")?;
/// let request = HttpRequest::post(url).with_body(b"hello".to_vec());
/// let response = client.request(request).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new HTTP client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Creates an HTTP client from an existing reqwest client.
    ///
    /// Useful when you need custom configuration (timeouts, TLS, etc.).
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { inner: client }
    }

    /// Creates an HTTP client with timeouts and an optional proxy.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Client`] if the proxy URL is invalid or the
    /// client cannot be built.
    pub fn with_options(options: &ClientOptions) -> Result<Self, HttpError> {
        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout);

        if let Some(settings) = &options.proxy {
            tracing::debug!("using proxy {}:{}", settings.server, settings.port);
            builder = builder.proxy(build_proxy(settings)?);
        }

        let inner = builder
            .build()
            .map_err(|e| HttpError::Client(Box::new(e)))?;

        Ok(Self { inner })
    }
}

fn build_proxy(settings: &ProxySettings) -> Result<reqwest::Proxy, HttpError> {
    let mut proxy =
        reqwest::Proxy::all(settings.url()).map_err(|e| HttpError::Client(Box::new(e)))?;

    if settings.user.is_some() || settings.password.is_some() {
        let user = settings.user.as_deref().unwrap_or_default();
        let password = settings.password.as_deref().unwrap_or_default();
        tracing::debug!("use proxy authentication with user {user}");
        proxy = proxy.basic_auth(user, password);
    }

    if !settings.excludes.is_empty() {
        proxy = proxy.no_proxy(reqwest::NoProxy::from_string(&settings.excludes.join(",")));
    }

    Ok(proxy)
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self.inner.request(req.method, req.url.as_str());

        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else if e.is_builder() {
                HttpError::InvalidUrl(e.to_string())
            } else {
                HttpError::Connection(Box::new(e))
            }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::Connection(Box::new(e)))?
            .to_vec();

        Ok(HttpResponse::new(status, body))
    }
}
