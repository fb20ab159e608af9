//! Gate configuration.
//!
//! [`GateConfig`] is built once and is immutable afterwards. Every option
//! except the secret has a default:
//!
//! | Option      | Default                          |
//! |-------------|----------------------------------|
//! | `secure`    | `true`                           |
//! | `relaxed`   | `["localhost", "127.0.0.1"]`     |
//! | `header`    | `authorization`                  |
//! | `regexp`    | `(?i)Bearer\s+(.*)$`             |
//! | `cookie`    | `token`                          |
//! | `attribute` | `token`                          |
//! | `ttl`       | none                             |
//! | `path`      | every path                       |
//! | `ignore`    | nothing                          |
//!
//! # Example
//!
//! ```
//! use tollgate::GateConfig;
//!
//! let config = GateConfig::builder("supersecretkeyyoushouldnotcommit")
//!     .ttl(3600)
//!     .path(["/api"])
//!     .ignore(["/api/token"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.ttl(), Some(3600));
//! assert_eq!(config.attribute(), Some("token"));
//! ```

use crate::codec::Secret;
use crate::error::{GateError, GateResult};
use crate::hooks::{
    AfterHook, BeforeHook, ErrorContext, ErrorHook, FnAfter, FnBefore, FnError, HookError,
    TokenContext,
};
use crate::locator::TokenLocator;
use crate::rules::{Rule, RuleChain};
use crate::transport::{TransportGate, DEFAULT_RELAXED};
use crate::types::{Request, Response};
use http::HeaderName;
use regex::Regex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::Dispatch;

/// Default token header.
pub const DEFAULT_HEADER: &str = "authorization";

/// Default header pattern. The single capture group is the token.
pub const DEFAULT_REGEXP: &str = r"(?i)Bearer\s+(.*)$";

/// Default fallback cookie.
pub const DEFAULT_COOKIE: &str = "token";

/// Default attribute the decoded payload is stored under.
pub const DEFAULT_ATTRIBUTE: &str = "token";

/// Immutable gate configuration.
#[derive(Clone)]
pub struct GateConfig {
    pub(crate) secret: Secret,
    pub(crate) ttl: Option<u32>,
    pub(crate) transport: TransportGate,
    pub(crate) locator: TokenLocator,
    pub(crate) attribute: Option<String>,
    pub(crate) rules: RuleChain,
    pub(crate) before: Option<Arc<dyn BeforeHook>>,
    pub(crate) after: Option<Arc<dyn AfterHook>>,
    pub(crate) error: Option<Arc<dyn ErrorHook>>,
    pub(crate) logger: Option<Dispatch>,
}

impl GateConfig {
    /// Starts a builder with the required secret.
    pub fn builder(secret: impl Into<Secret>) -> GateConfigBuilder {
        GateConfigBuilder::new(secret)
    }

    /// Key material passed to the codec.
    #[must_use]
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Maximum token age in seconds.
    #[must_use]
    pub const fn ttl(&self) -> Option<u32> {
        self.ttl
    }

    /// Transport security settings.
    #[must_use]
    pub fn transport(&self) -> &TransportGate {
        &self.transport
    }

    /// Token lookup settings.
    #[must_use]
    pub fn locator(&self) -> &TokenLocator {
        &self.locator
    }

    /// Attribute name for the decoded payload, if injection is enabled.
    #[must_use]
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Rules deciding whether a request is authenticated.
    #[must_use]
    pub fn rules(&self) -> &RuleChain {
        &self.rules
    }

    /// The dedicated log sink, if any.
    #[must_use]
    pub fn logger(&self) -> Option<&Dispatch> {
        self.logger.as_ref()
    }
}

impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("secret", &self.secret)
            .field("ttl", &self.ttl)
            .field("transport", &self.transport)
            .field("locator", &self.locator)
            .field("attribute", &self.attribute)
            .field("rules", &self.rules)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("error", &self.error.is_some())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Builder for [`GateConfig`].
///
/// Values are validated in [`build`](Self::build).
#[must_use]
pub struct GateConfigBuilder {
    secret: Secret,
    ttl: Option<u32>,
    secure: bool,
    relaxed: Vec<String>,
    header: String,
    regexp: String,
    cookie: String,
    attribute: Option<String>,
    path: Option<Vec<String>>,
    ignore: Vec<String>,
    rules: Option<RuleChain>,
    before: Option<Arc<dyn BeforeHook>>,
    after: Option<Arc<dyn AfterHook>>,
    error: Option<Arc<dyn ErrorHook>>,
    logger: Option<Dispatch>,
}

impl GateConfigBuilder {
    /// Creates a builder with default options.
    pub fn new(secret: impl Into<Secret>) -> Self {
        Self {
            secret: secret.into(),
            ttl: None,
            secure: true,
            relaxed: DEFAULT_RELAXED.iter().map(ToString::to_string).collect(),
            header: DEFAULT_HEADER.to_string(),
            regexp: DEFAULT_REGEXP.to_string(),
            cookie: DEFAULT_COOKIE.to_string(),
            attribute: Some(DEFAULT_ATTRIBUTE.to_string()),
            path: None,
            ignore: Vec::new(),
            rules: None,
            before: None,
            after: None,
            error: None,
            logger: None,
        }
    }

    /// Sets the maximum token age in seconds.
    pub fn ttl(mut self, seconds: u32) -> Self {
        self.ttl = Some(seconds);
        self
    }

    /// Requires HTTPS for non-relaxed hosts.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Replaces the hosts allowed over plain HTTP.
    pub fn relaxed<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relaxed = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the header searched for the token.
    pub fn header(mut self, name: impl Into<String>) -> Self {
        self.header = name.into();
        self
    }

    /// Sets the header pattern. It must have exactly one capture group.
    pub fn regexp(mut self, pattern: impl Into<String>) -> Self {
        self.regexp = pattern.into();
        self
    }

    /// Sets the fallback cookie.
    pub fn cookie(mut self, name: impl Into<String>) -> Self {
        self.cookie = name.into();
        self
    }

    /// Sets the attribute the payload is stored under. Empty disables it.
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.attribute = (!name.is_empty()).then_some(name);
        self
    }

    /// Restricts authentication to path prefixes.
    pub fn path<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }

    /// Excludes path prefixes from authentication.
    pub fn ignore<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the default rules. `path` and `ignore` then have no effect.
    pub fn rules(mut self, rules: RuleChain) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Appends a rule to the explicit rule chain, replacing the defaults.
    pub fn rule(mut self, rule: impl Rule) -> Self {
        self.rules = Some(self.rules.take().unwrap_or_default().with(rule));
        self
    }

    /// Appends a closure rule. See [`rule`](Self::rule).
    pub fn rule_fn<F>(self, rule: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.rule(rule)
    }

    /// Sets the before hook from an async function.
    pub fn before<F, Fut>(self, hook: F) -> Self
    where
        F: Fn(Request, TokenContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Request, HookError>> + Send + 'static,
    {
        self.before_hook(FnBefore::new(hook))
    }

    /// Sets the before hook.
    pub fn before_hook(mut self, hook: impl BeforeHook) -> Self {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Sets the after hook from an async function.
    pub fn after<F, Fut>(self, hook: F) -> Self
    where
        F: Fn(Response, TokenContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HookError>> + Send + 'static,
    {
        self.after_hook(FnAfter::new(hook))
    }

    /// Sets the after hook.
    pub fn after_hook(mut self, hook: impl AfterHook) -> Self {
        self.after = Some(Arc::new(hook));
        self
    }

    /// Sets the error hook from an async function.
    pub fn error<F, Fut>(self, hook: F) -> Self
    where
        F: Fn(Request, Response, ErrorContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HookError>> + Send + 'static,
    {
        self.error_hook(FnError::new(hook))
    }

    /// Sets the error hook.
    pub fn error_hook(mut self, hook: impl ErrorHook) -> Self {
        self.error = Some(Arc::new(hook));
        self
    }

    /// Routes the gate's log events to `dispatch` instead of the ambient
    /// subscriber.
    pub fn logger(mut self, dispatch: impl Into<Dispatch>) -> Self {
        self.logger = Some(dispatch.into());
        self
    }

    /// Validates the options and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] for an empty secret, an invalid
    /// header name, or a pattern that does not compile or does not have
    /// exactly one capture group.
    pub fn build(self) -> GateResult<GateConfig> {
        if self.secret.is_empty() {
            return Err(GateError::invalid_config("secret", "must not be empty"));
        }

        let header = HeaderName::from_bytes(self.header.as_bytes())
            .map_err(|err| GateError::invalid_config("header", err.to_string()))?;

        let regexp = Regex::new(&self.regexp)
            .map_err(|err| GateError::invalid_config("regexp", err.to_string()))?;
        // captures_len counts the implicit whole-match group
        if regexp.captures_len() != 2 {
            return Err(GateError::invalid_config(
                "regexp",
                format!(
                    "must contain exactly one capture group, found {}",
                    regexp.captures_len() - 1
                ),
            ));
        }

        let rules = self
            .rules
            .unwrap_or_else(|| RuleChain::defaults(self.path, self.ignore));

        Ok(GateConfig {
            secret: self.secret,
            ttl: self.ttl,
            transport: TransportGate::new(self.secure, self.relaxed),
            locator: TokenLocator::new(header, regexp, self.cookie),
            attribute: self.attribute,
            rules,
            before: self.before,
            after: self.after,
            error: self.error,
            logger: self.logger,
        })
    }
}

impl fmt::Debug for GateConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfigBuilder")
            .field("secret", &self.secret)
            .field("ttl", &self.ttl)
            .field("secure", &self.secure)
            .field("header", &self.header)
            .field("regexp", &self.regexp)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::Method;
    use http_body_util::Full;

    fn request(method: Method, path: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = GateConfig::builder("k").build().unwrap();

        assert_eq!(config.secret().expose(), b"k");
        assert_eq!(config.ttl(), None);
        assert!(config.transport().secure());
        assert_eq!(config.transport().relaxed(), &["localhost", "127.0.0.1"]);
        assert_eq!(config.locator().header(), &http::header::AUTHORIZATION);
        assert_eq!(config.locator().regexp().as_str(), DEFAULT_REGEXP);
        assert_eq!(config.locator().cookie(), "token");
        assert_eq!(config.attribute(), Some("token"));
        assert_eq!(config.rules().len(), 2);
        assert!(config.logger().is_none());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let err = GateConfig::builder("").build().unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig { field: "secret", .. }));
    }

    #[test]
    fn test_regexp_group_count() {
        let err = GateConfig::builder("k")
            .regexp(r"Bearer\s+.*")
            .build()
            .unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig { field: "regexp", .. }));
        assert!(err.to_string().contains("found 0"));

        let err = GateConfig::builder("k")
            .regexp(r"(\w+)\s+(.*)")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("found 2"));

        assert!(GateConfig::builder("k")
            .regexp(r"(?:Token|Bearer)\s+(.*)")
            .build()
            .is_ok());
    }

    #[test]
    fn test_invalid_regexp() {
        let err = GateConfig::builder("k").regexp("(").build().unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig { field: "regexp", .. }));
    }

    #[test]
    fn test_invalid_header() {
        let err = GateConfig::builder("k")
            .header("not a header")
            .build()
            .unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig { field: "header", .. }));
    }

    #[test]
    fn test_header_name_is_normalized() {
        let config = GateConfig::builder("k").header("X-Token").build().unwrap();
        assert_eq!(config.locator().header().as_str(), "x-token");
    }

    #[test]
    fn test_empty_attribute_disables_injection() {
        let config = GateConfig::builder("k").attribute("").build().unwrap();
        assert_eq!(config.attribute(), None);
    }

    #[test]
    fn test_explicit_rules_replace_defaults() {
        let config = GateConfig::builder("k")
            .path(["/api"])
            .rule_fn(|request: &Request| request.method() != Method::DELETE)
            .build()
            .unwrap();

        assert_eq!(config.rules().len(), 1);
        // OPTIONS and the path restriction no longer apply
        assert!(config.rules().should_authenticate(&request(Method::OPTIONS, "/public")));
        assert!(!config.rules().should_authenticate(&request(Method::DELETE, "/api")));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = GateConfig::builder("hunter2").build().unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("redacted"));
    }
}
