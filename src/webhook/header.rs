//! Execution headers with constant, deferred and content-dependent values.

use std::fmt;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::secret::SecretCipher;

use super::error::{BoxError, HeaderError};

type HmacSha256 = Hmac<Sha256>;

/// Zero-argument value supplier.
pub type Supplier = Arc<dyn Fn() -> Result<String, BoxError> + Send + Sync>;

/// Value computed from the serialized request body (`None` without body).
pub type ContentFn = Arc<dyn Fn(Option<&[u8]>) -> Result<String, BoxError> + Send + Sync>;

/// Persisted header as configured on a hook.
///
/// For concealed headers `value` holds the encrypted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRecord {
    /// Header name
    pub key: String,
    /// Header value (ciphertext when `concealed`)
    pub value: String,
    /// Whether the value is a secret
    #[serde(default)]
    pub concealed: bool,
}

impl HeaderRecord {
    /// Creates a plain header record.
    #[must_use]
    pub fn plain(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            concealed: false,
        }
    }

    /// Creates a concealed header record holding `value` as given.
    #[must_use]
    pub fn concealed(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            concealed: true,
        }
    }
}

/// Where the value of an [`ExecutionHeader`] comes from.
#[derive(Clone)]
pub enum HeaderValueSource {
    /// A fixed value.
    Constant(String),
    /// A value computed when the request is built.
    Supplier(Supplier),
    /// A value computed from the request body (e.g. a signature).
    Content(ContentFn),
}

impl fmt::Debug for HeaderValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(_) => f.write_str("Constant(..)"),
            Self::Supplier(_) => f.write_str("Supplier(..)"),
            Self::Content(_) => f.write_str("Content(..)"),
        }
    }
}

/// A header attached to an outgoing webhook request.
///
/// The value is resolved at send time. Sensitive headers are marked as such
/// on the request so their value is hidden from `Debug` output.
#[derive(Debug, Clone)]
pub struct ExecutionHeader {
    key: String,
    source: HeaderValueSource,
    sensitive: bool,
}

impl ExecutionHeader {
    /// Header with a fixed value.
    #[must_use]
    pub fn constant(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: HeaderValueSource::Constant(value.into()),
            sensitive: false,
        }
    }

    /// Header whose value is computed when the request is built.
    #[must_use]
    pub fn supplier<F>(key: impl Into<String>, supplier: F) -> Self
    where
        F: Fn() -> Result<String, BoxError> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            source: HeaderValueSource::Supplier(Arc::new(supplier)),
            sensitive: false,
        }
    }

    /// Header whose value is computed from the serialized request body.
    #[must_use]
    pub fn content<F>(key: impl Into<String>, content_fn: F) -> Self
    where
        F: Fn(Option<&[u8]>) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            source: HeaderValueSource::Content(Arc::new(content_fn)),
            sensitive: false,
        }
    }

    /// Header whose stored value is decrypted right before sending.
    #[must_use]
    pub fn concealed(
        key: impl Into<String>,
        stored: impl Into<String>,
        cipher: Arc<dyn SecretCipher>,
    ) -> Self {
        let stored = stored.into();
        Self::supplier(key, move || {
            let secret = cipher.decrypt(&stored)?;
            Ok(secret.expose_secret().to_owned())
        })
        .sensitive()
    }

    /// `sha256=<hex>` HMAC of the request body, keyed with `secret`.
    ///
    /// Requests without a body are signed over the empty input.
    #[must_use]
    pub fn hmac_sha256(key: impl Into<String>, secret: SecretString) -> Self {
        Self::content(key, move |content| {
            let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
                .map_err(|e| e.to_string())?;
            mac.update(content.unwrap_or_default());
            Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
        })
    }

    /// Builds the header for a persisted record.
    ///
    /// Concealed records decrypt through `cipher` at send time.
    #[must_use]
    pub fn from_record(record: &HeaderRecord, cipher: &Arc<dyn SecretCipher>) -> Self {
        if record.concealed {
            Self::concealed(&record.key, &record.value, Arc::clone(cipher))
        } else {
            Self::constant(&record.key, &record.value)
        }
    }

    /// Builds headers for a list of persisted records.
    #[must_use]
    pub fn from_records(records: &[HeaderRecord], cipher: &Arc<dyn SecretCipher>) -> Vec<Self> {
        records
            .iter()
            .map(|record| Self::from_record(record, cipher))
            .collect()
    }

    /// Marks the header value as sensitive.
    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Returns the header name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns true if the value must be hidden.
    #[must_use]
    pub const fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Returns true if the value is computed from the request body.
    #[must_use]
    pub const fn requires_content(&self) -> bool {
        matches!(self.source, HeaderValueSource::Content(_))
    }

    /// Computes the header value.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::Value`] or [`HeaderError::Content`] if the value
    /// source fails.
    pub fn value(&self, content: Option<&[u8]>) -> Result<String, HeaderError> {
        match &self.source {
            HeaderValueSource::Constant(value) => Ok(value.clone()),
            HeaderValueSource::Supplier(supplier) => {
                supplier().map_err(|source| HeaderError::Value {
                    key: self.key.clone(),
                    source,
                })
            }
            HeaderValueSource::Content(content_fn) => {
                content_fn(content).map_err(|source| HeaderError::Content {
                    key: self.key.clone(),
                    source,
                })
            }
        }
    }

    /// Computes the header as a typed name/value pair.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] if the value source fails or the result is
    /// not a legal header.
    pub fn resolve(
        &self,
        content: Option<&[u8]>,
    ) -> Result<(http::HeaderName, http::HeaderValue), HeaderError> {
        let name = self
            .key
            .parse::<http::HeaderName>()
            .map_err(|e| HeaderError::Invalid {
                key: self.key.clone(),
                reason: e.to_string(),
            })?;

        let mut value = http::HeaderValue::try_from(self.value(content)?).map_err(|e| {
            HeaderError::Invalid {
                key: self.key.clone(),
                reason: e.to_string(),
            }
        })?;
        value.set_sensitive(self.sensitive);

        Ok((name, value))
    }
}
