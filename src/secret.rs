//! Encryption of concealed header values.
//!
//! Concealed header values are stored encrypted and only decrypted right
//! before a request is sent. Decrypted values are handed out as
//! [`SecretString`] so they are zeroized on drop and hidden from `Debug`.

use std::fmt;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::SecretString;
use thiserror::Error;

/// Length of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of an AES-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Error type for secret operations.
///
/// Messages never contain the secret itself.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The key has the wrong length or is not valid base64.
    #[error("Invalid secret key: {0}")]
    InvalidKey(String),

    /// Encryption failed.
    #[error("Failed to encrypt secret")]
    Encrypt,

    /// The stored value is not a ciphertext produced by this key.
    #[error("Failed to decrypt secret: {0}")]
    Decrypt(&'static str),
}

/// Encrypts and decrypts concealed values.
pub trait SecretCipher: Send + Sync {
    /// Encrypts a plaintext value into its stored form.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Encrypt`] if encryption fails.
    fn encrypt(&self, plaintext: &str) -> Result<String, SecretError>;

    /// Decrypts a stored value.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Decrypt`] if the value was not produced by
    /// [`encrypt`](Self::encrypt) with the same key.
    fn decrypt(&self, ciphertext: &str) -> Result<SecretString, SecretError>;
}

/// AES-256-GCM cipher with a random nonce per value.
///
/// Stored form is `base64(nonce || ciphertext || tag)`.
#[derive(Clone)]
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmCipher").finish_non_exhaustive()
    }
}

impl AesGcmCipher {
    /// Creates a cipher from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::InvalidKey`] unless the key is [`KEY_LEN`] bytes.
    pub fn new(key: &[u8]) -> Result<Self, SecretError> {
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| {
            SecretError::InvalidKey(format!("expected {KEY_LEN} bytes, got {}", key.len()))
        })?;
        Ok(Self { cipher })
    }

    /// Creates a cipher from a base64-encoded key.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::InvalidKey`] if the key is not valid base64 or
    /// has the wrong length.
    pub fn from_base64(key: &str) -> Result<Self, SecretError> {
        let bytes = STANDARD
            .decode(key.trim())
            .map_err(|e| SecretError::InvalidKey(e.to_string()))?;
        Self::new(&bytes)
    }

    /// Generates a fresh random key, base64-encoded.
    #[must_use]
    pub fn generate_key() -> String {
        STANDARD.encode(Aes256Gcm::generate_key(OsRng))
    }
}

impl SecretCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, SecretError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| SecretError::Encrypt)?;

        let mut stored = nonce.to_vec();
        stored.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(stored))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<SecretString, SecretError> {
        let bytes = STANDARD
            .decode(ciphertext)
            .map_err(|_| SecretError::Decrypt("not base64"))?;

        if bytes.len() <= NONCE_LEN {
            return Err(SecretError::Decrypt("value too short"));
        }

        let (nonce, sealed) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| SecretError::Decrypt("authentication failed"))?;

        String::from_utf8(plaintext)
            .map(SecretString::from)
            .map_err(|_| SecretError::Decrypt("not valid UTF-8"))
    }
}
