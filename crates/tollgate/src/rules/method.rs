use super::Rule;
use crate::types::Request;
use http::Method;

/// Skips authentication for a set of methods.
///
/// The default set is `OPTIONS`, so CORS preflight requests pass through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRule {
    ignore: Vec<Method>,
}

impl MethodRule {
    /// Creates a rule ignoring `methods`.
    pub fn new(methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            ignore: methods.into_iter().collect(),
        }
    }

    /// The ignored methods.
    #[must_use]
    pub fn ignored(&self) -> &[Method] {
        &self.ignore
    }
}

impl Default for MethodRule {
    fn default() -> Self {
        Self::new([Method::OPTIONS])
    }
}

impl Rule for MethodRule {
    fn applies(&self, request: &Request) -> bool {
        !self.ignore.contains(request.method())
    }
}
