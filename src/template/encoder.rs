//! URL encoding of free-text values.

use url::form_urlencoded;

/// Encodes a value with `application/x-www-form-urlencoded` rules.
///
/// Spaces become `+`, alphanumerics and `*-._` pass through, everything
/// else is percent-encoded as UTF-8.
#[must_use]
pub fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Encodes every element of a list.
#[must_use]
pub fn encode_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| encode(v)).collect()
}
