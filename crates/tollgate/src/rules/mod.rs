//! Rules deciding whether a request needs authentication.
//!
//! A [`Rule`] answers `true` when authentication applies and `false` when the
//! request may pass through untouched. A [`RuleChain`] evaluates rules in
//! order and stops at the first `false`.
//!
//! # Example
//!
//! ```
//! use tollgate::rules::{MethodRule, PathRule, RuleChain};
//! use tollgate::Request;
//!
//! let chain = RuleChain::new()
//!     .with(MethodRule::default())
//!     .with(PathRule::new().with_path(["/api"]).with_ignore(["/api/health"]))
//!     .with(|request: &Request| !request.headers().contains_key("x-internal"));
//!
//! let request = http::Request::get("/api/users")
//!     .body(Default::default())
//!     .unwrap();
//! assert!(chain.should_authenticate(&request));
//! ```

mod method;
mod path;

pub use method::MethodRule;
pub use path::PathRule;

use crate::types::Request;
use std::fmt;
use std::sync::Arc;

/// A predicate over a request.
pub trait Rule: Send + Sync + 'static {
    /// Returns true if authentication applies to `request`.
    fn applies(&self, request: &Request) -> bool;
}

impl<F> Rule for F
where
    F: Fn(&Request) -> bool + Send + Sync + 'static,
{
    fn applies(&self, request: &Request) -> bool {
        self(request)
    }
}

/// Ordered rules combined with logical AND.
#[derive(Clone, Default)]
pub struct RuleChain {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleChain {
    /// Creates an empty chain. An empty chain authenticates every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain used when no rules are configured: skip `OPTIONS`, then
    /// restrict to `path` minus `ignore`.
    #[must_use]
    pub fn defaults(path: Option<Vec<String>>, ignore: Vec<String>) -> Self {
        let mut path_rule = PathRule::new().with_ignore(ignore);
        if let Some(path) = path {
            path_rule = path_rule.with_path(path);
        }
        Self::new().with(MethodRule::default()).with(path_rule)
    }

    /// Appends a rule.
    #[must_use]
    pub fn with(mut self, rule: impl Rule) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Appends a shared rule.
    #[must_use]
    pub fn with_shared(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Returns true unless some rule returns false.
    ///
    /// Rules after the first `false` are not evaluated.
    #[must_use]
    pub fn should_authenticate(&self, request: &Request) -> bool {
        self.rules.iter().all(|rule| rule.applies(request))
    }

    /// Number of rules in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the chain has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for RuleChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleChain")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl<R: Rule> FromIterator<R> for RuleChain {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::with)
    }
}
