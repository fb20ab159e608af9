//! The token codec seam.
//!
//! The gate never looks inside a credential. Decryption, authentication and
//! the expiry check are delegated to a [`TokenCodec`]; the gate only learns
//! whether decoding succeeded and, if it did, receives the payload as a
//! [`Decoded`] value.

use crate::middleware::BoxFuture;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::fmt;
use thiserror::Error;

/// Key material handed to the codec.
///
/// The bytes are never printed: `Debug` renders a fixed placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Bytes);

impl Secret {
    /// Wraps raw key material.
    pub fn new(key: impl Into<Bytes>) -> Self {
        Self(key.into())
    }

    /// The raw key bytes.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Returns true if no key material is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(**redacted**)")
    }
}

impl From<&str> for Secret {
    fn from(key: &str) -> Self {
        Self(Bytes::copy_from_slice(key.as_bytes()))
    }
}

impl From<String> for Secret {
    fn from(key: String) -> Self {
        Self(Bytes::from(key))
    }
}

impl From<Vec<u8>> for Secret {
    fn from(key: Vec<u8>) -> Self {
        Self(Bytes::from(key))
    }
}

/// Payload recovered from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded(Bytes);

impl Decoded {
    /// Wraps a decoded payload.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self(payload.into())
    }

    /// Wraps a static payload.
    #[must_use]
    pub const fn from_static(payload: &'static [u8]) -> Self {
        Self(Bytes::from_static(payload))
    }

    /// The payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The payload as UTF-8 text.
    pub fn to_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.0)
    }

    /// Deserializes a JSON payload.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.0)
    }

    /// Consumes the value, returning the payload bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

/// A token the codec refused.
///
/// The message is opaque to the gate; it is logged and handed to the error
/// hook unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CodecError {
    /// Why the token was refused.
    pub message: String,
}

impl CodecError {
    /// Create a codec error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Decodes and validates credentials.
///
/// Implementations verify authenticity, reject tokens older than `ttl`
/// seconds when a ttl is given, and return the payload.
pub trait TokenCodec: Send + Sync + 'static {
    /// Decode `token` with `secret`.
    fn decode<'a>(
        &'a self,
        secret: &'a Secret,
        token: &'a str,
        ttl: Option<u32>,
    ) -> BoxFuture<'a, Result<Decoded, CodecError>>;
}

/// A codec built from a synchronous function.
///
/// # Example
///
/// ```
/// use tollgate::codec::{CodecError, Decoded, FnCodec};
///
/// let codec = FnCodec::new(|_secret, token, _ttl| {
///     token
///         .strip_prefix("ok:")
///         .map(|payload| Decoded::new(payload.to_string()))
///         .ok_or_else(|| CodecError::new("Invalid token"))
/// });
/// # let _ = codec;
/// ```
pub struct FnCodec<F> {
    func: F,
}

impl<F> FnCodec<F>
where
    F: Fn(&Secret, &str, Option<u32>) -> Result<Decoded, CodecError> + Send + Sync + 'static,
{
    /// Creates a codec from `func`.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> fmt::Debug for FnCodec<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}

impl<F> TokenCodec for FnCodec<F>
where
    F: Fn(&Secret, &str, Option<u32>) -> Result<Decoded, CodecError> + Send + Sync + 'static,
{
    fn decode<'a>(
        &'a self,
        secret: &'a Secret,
        token: &'a str,
        ttl: Option<u32>,
    ) -> BoxFuture<'a, Result<Decoded, CodecError>> {
        let result = (self.func)(secret, token, ttl);
        Box::pin(std::future::ready(result))
    }
}
