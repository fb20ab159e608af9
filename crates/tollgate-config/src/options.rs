//! Serializable gate options.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tollgate::config::{DEFAULT_ATTRIBUTE, DEFAULT_COOKIE, DEFAULT_HEADER, DEFAULT_REGEXP};
use tollgate::transport::DEFAULT_RELAXED;
use tollgate::{GateConfig, GateConfigBuilder};

/// The data options of a gate.
///
/// Rules, hooks and the logger are code values; set them on the builder
/// returned by [`into_builder`](Self::into_builder).
///
/// # Example
///
/// ```
/// use tollgate_config::GateOptions;
///
/// let options: GateOptions = toml::from_str(r#"
///     secret = "supersecretkeyyoushouldnotcommit"
///     ttl = 3600
///     path = ["/api"]
///     ignore = ["/api/token"]
/// "#).unwrap();
///
/// assert_eq!(options.ttl, Some(3600));
/// assert!(options.secure);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateOptions {
    /// Key material for the codec. Required.
    pub secret: Option<String>,

    /// Maximum token age in seconds.
    pub ttl: Option<u32>,

    /// Require HTTPS for hosts not in `relaxed`.
    pub secure: bool,

    /// Hosts allowed over plain HTTP.
    pub relaxed: Vec<String>,

    /// Header searched for the token.
    pub header: String,

    /// Pattern applied to the header value; exactly one capture group.
    pub regexp: String,

    /// Fallback cookie.
    pub cookie: String,

    /// Attribute the payload is stored under; empty disables it.
    pub attribute: String,

    /// Path prefixes to authenticate; unset means all paths.
    pub path: Option<Vec<String>>,

    /// Path prefixes never authenticated.
    pub ignore: Vec<String>,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            secret: None,
            ttl: None,
            secure: true,
            relaxed: DEFAULT_RELAXED.iter().map(ToString::to_string).collect(),
            header: DEFAULT_HEADER.to_string(),
            regexp: DEFAULT_REGEXP.to_string(),
            cookie: DEFAULT_COOKIE.to_string(),
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            path: None,
            ignore: Vec::new(),
        }
    }
}

impl GateOptions {
    /// Checks that required options are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.secret.as_deref() {
            Some(secret) if !secret.is_empty() => Ok(()),
            _ => Err(ConfigError::missing_field("secret")),
        }
    }

    /// Converts the options into a gate builder.
    pub fn into_builder(self) -> Result<GateConfigBuilder, ConfigError> {
        self.validate()?;
        let Self {
            secret,
            ttl,
            secure,
            relaxed,
            header,
            regexp,
            cookie,
            attribute,
            path,
            ignore,
        } = self;

        let mut builder = GateConfig::builder(secret.unwrap_or_default())
            .secure(secure)
            .relaxed(relaxed)
            .header(header)
            .regexp(regexp)
            .cookie(cookie)
            .attribute(attribute)
            .ignore(ignore);
        if let Some(ttl) = ttl {
            builder = builder.ttl(ttl);
        }
        if let Some(path) = path {
            builder = builder.path(path);
        }
        Ok(builder)
    }

    /// Builds a gate configuration with no rules, hooks or logger beyond the
    /// defaults.
    pub fn build(self) -> Result<GateConfig, ConfigError> {
        Ok(self.into_builder()?.build()?)
    }
}

impl fmt::Debug for GateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateOptions")
            .field("secret", &self.secret.as_ref().map(|_| "**redacted**"))
            .field("ttl", &self.ttl)
            .field("secure", &self.secure)
            .field("relaxed", &self.relaxed)
            .field("header", &self.header)
            .field("regexp", &self.regexp)
            .field("cookie", &self.cookie)
            .field("attribute", &self.attribute)
            .field("path", &self.path)
            .field("ignore", &self.ignore)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secret() -> GateOptions {
        GateOptions {
            secret: Some("k".to_string()),
            ..GateOptions::default()
        }
    }

    #[test]
    fn test_defaults() {
        let options = GateOptions::default();
        assert!(options.secure);
        assert_eq!(options.relaxed, vec!["localhost", "127.0.0.1"]);
        assert_eq!(options.header, "authorization");
        assert_eq!(options.cookie, "token");
        assert_eq!(options.attribute, "token");
        assert!(options.path.is_none());
    }

    #[test]
    fn test_missing_secret() {
        let err = GateOptions::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "secret"));

        let empty = GateOptions {
            secret: Some(String::new()),
            ..GateOptions::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<GateOptions, _> = toml::from_str("secret = \"k\"\nsecrett = \"typo\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options: GateOptions =
            serde_json::from_str(r#"{"secret": "k", "secure": false, "cookie": "session"}"#)
                .unwrap();
        assert!(!options.secure);
        assert_eq!(options.cookie, "session");
        assert_eq!(options.header, "authorization");
    }

    #[test]
    fn test_build() {
        let options = GateOptions {
            ttl: Some(60),
            attribute: String::new(),
            path: Some(vec!["/api".to_string()]),
            ..with_secret()
        };

        let config = options.build().unwrap();
        assert_eq!(config.ttl(), Some(60));
        assert_eq!(config.attribute(), None);
        assert_eq!(config.rules().len(), 2);
    }

    #[test]
    fn test_build_surfaces_gate_errors() {
        let options = GateOptions {
            regexp: "Bearer .*".to_string(),
            ..with_secret()
        };
        let err = options.build().unwrap_err();
        assert!(matches!(err, ConfigError::Gate(_)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let printed = format!("{:?}", with_secret());
        assert!(printed.contains("redacted"));
        assert!(!printed.contains("\"k\""));
    }
}
