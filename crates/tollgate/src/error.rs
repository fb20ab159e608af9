//! Error types for the gate.
//!
//! Errors fall into three groups:
//!
//! | Group          | Variants                              | Handling                          |
//! |----------------|---------------------------------------|-----------------------------------|
//! | Fatal          | `InsecureTransport`, `InvalidConfig`  | Returned to the host as `Err`     |
//! | Credential     | `TokenNotFound`, `CredentialInvalid`  | Turned into a 401 by the error hook step |
//! | Extension code | `Hook`                                | Returned to the host as `Err`     |

use crate::hooks::HookError;
use thiserror::Error;

/// Result type alias using [`GateError`].
pub type GateResult<T> = Result<T, GateError>;

/// Errors produced by the gate pipeline.
#[derive(Debug, Error)]
pub enum GateError {
    /// Authentication was required over an insecure scheme to a host that is
    /// not relaxed.
    #[error("Insecure use of middleware over {} denied by configuration.", .scheme.to_uppercase())]
    InsecureTransport {
        /// The request scheme.
        scheme: String,
    },

    /// Neither the header nor the cookie carried a token.
    #[error("Token not found")]
    TokenNotFound,

    /// The codec rejected the token.
    #[error("{message}")]
    CredentialInvalid {
        /// The codec's message.
        message: String,
    },

    /// The gate was configured with an unusable value.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        /// The offending option.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A before, after or error hook failed.
    #[error(transparent)]
    Hook(#[from] HookError),
}

impl GateError {
    /// Create an insecure transport error.
    pub fn insecure(scheme: impl Into<String>) -> Self {
        Self::InsecureTransport {
            scheme: scheme.into(),
        }
    }

    /// Create a credential error from a codec message.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::CredentialInvalid {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Returns true for failures caused by the caller's credential.
    ///
    /// These become unauthorized responses; every other variant is returned
    /// to the host.
    #[must_use]
    pub const fn is_credential_failure(&self) -> bool {
        matches!(self, Self::TokenNotFound | Self::CredentialInvalid { .. })
    }

    /// Short label used for metrics.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InsecureTransport { .. } => "insecure_transport",
            Self::TokenNotFound => "not_found",
            Self::CredentialInvalid { .. } => "invalid",
            Self::InvalidConfig { .. } => "invalid_config",
            Self::Hook(_) => "hook",
        }
    }
}
