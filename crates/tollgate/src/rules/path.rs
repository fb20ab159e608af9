use super::Rule;
use crate::types::{Request, RequestExt};
use std::borrow::Cow;

/// Restricts authentication to path prefixes.
///
/// Applies when the request path starts with one of `path` (or `path` is
/// unset) and with none of `ignore`. Prefixes match on raw string prefix, so
/// `/api` also covers `/apidocs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathRule {
    path: Option<Vec<String>>,
    ignore: Vec<String>,
}

impl PathRule {
    /// Creates a rule covering every path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the rule to `prefixes`.
    #[must_use]
    pub fn with_path<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }

    /// Excludes `prefixes` from the rule.
    #[must_use]
    pub fn with_ignore<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if authentication applies to `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path = collapse_slashes(path);

        if self.ignore.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return false;
        }

        self.path
            .as_ref()
            .map_or(true, |prefixes| {
                prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
            })
    }
}

impl Rule for PathRule {
    fn applies(&self, request: &Request) -> bool {
        self.matches(request.path())
    }
}

fn collapse_slashes(path: &str) -> Cow<'_, str> {
    if !path.contains("//") {
        return Cow::Borrowed(path);
    }

    let mut collapsed = String::with_capacity(path.len());
    let mut previous = None;
    for ch in path.chars() {
        if ch == '/' && previous == Some('/') {
            continue;
        }
        collapsed.push(ch);
        previous = Some(ch);
    }
    Cow::Owned(collapsed)
}
