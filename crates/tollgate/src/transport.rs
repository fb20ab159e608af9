//! Refusing authentication over plain-text transport.

use crate::error::{GateError, GateResult};
use crate::types::{Request, RequestExt};

/// Hosts that may authenticate over plain HTTP when `secure` is on.
pub const DEFAULT_RELAXED: [&str; 2] = ["localhost", "127.0.0.1"];

/// Rejects requests that would send credentials over an insecure scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportGate {
    secure: bool,
    relaxed: Vec<String>,
}

impl TransportGate {
    /// Creates a gate. With `secure` off every request passes.
    pub fn new<I, S>(secure: bool, relaxed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            secure,
            relaxed: relaxed.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether HTTPS is required.
    #[must_use]
    pub const fn secure(&self) -> bool {
        self.secure
    }

    /// Hosts exempt from the HTTPS requirement.
    #[must_use]
    pub fn relaxed(&self) -> &[String] {
        &self.relaxed
    }

    /// Checks the scheme and host of `request`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InsecureTransport`] when the scheme is not
    /// `https`, `secure` is on and the host is not relaxed.
    pub fn enforce(&self, request: &Request) -> GateResult<()> {
        let scheme = request.scheme();
        if !self.secure || scheme == "https" {
            return Ok(());
        }

        // Host comparison is exact and case-sensitive.
        let relaxed = request
            .host()
            .is_some_and(|host| self.relaxed.iter().any(|allowed| allowed == host));
        if relaxed {
            return Ok(());
        }

        Err(GateError::insecure(scheme))
    }
}

impl Default for TransportGate {
    fn default() -> Self {
        Self::new(true, DEFAULT_RELAXED)
    }
}
