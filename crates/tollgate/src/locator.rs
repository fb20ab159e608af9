//! Finding the candidate token in a request.

use crate::error::{GateError, GateResult};
use crate::types::{Request, RequestExt};
use http::HeaderName;
use regex::Regex;
use std::fmt;

/// Where a token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// The configured header, matched by the configured pattern.
    Header,
    /// The configured cookie.
    Cookie,
}

impl TokenSource {
    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token and the place it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// The candidate token.
    pub token: String,
    /// Where it was found.
    pub source: TokenSource,
}

/// Extracts the candidate token: header first, cookie second.
///
/// The pattern must have exactly one capture group; its contents are the
/// token. A match whose group did not participate counts as no match.
#[derive(Debug, Clone)]
pub struct TokenLocator {
    header: HeaderName,
    regexp: Regex,
    cookie: String,
}

impl TokenLocator {
    /// Creates a locator.
    pub fn new(header: HeaderName, regexp: Regex, cookie: impl Into<String>) -> Self {
        Self {
            header,
            regexp,
            cookie: cookie.into(),
        }
    }

    /// The header searched first.
    #[must_use]
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// The pattern applied to the header value.
    #[must_use]
    pub fn regexp(&self) -> &Regex {
        &self.regexp
    }

    /// The cookie searched when the header yields nothing.
    #[must_use]
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Locates the token in `request`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::TokenNotFound`] when neither source yields one.
    pub fn locate(&self, request: &Request) -> GateResult<Located> {
        let located = self
            .from_header(request)
            .map(|token| Located {
                token,
                source: TokenSource::Header,
            })
            .or_else(|| {
                request.cookies().get(&self.cookie).map(|token| Located {
                    token: token.to_string(),
                    source: TokenSource::Cookie,
                })
            });

        match located {
            Some(located) => {
                tracing::debug!(source = %located.source, "Using token from request {}", located.source);
                Ok(located)
            }
            None => {
                tracing::warn!(
                    header = %self.header,
                    cookie = %self.cookie,
                    "Token not found"
                );
                Err(GateError::TokenNotFound)
            }
        }
    }

    fn from_header(&self, request: &Request) -> Option<String> {
        let value = request.first_header(&self.header);
        let captures = self.regexp.captures(value)?;
        captures.get(1).map(|group| group.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::header;
    use http_body_util::Full;

    fn locator() -> TokenLocator {
        TokenLocator::new(
            header::AUTHORIZATION,
            Regex::new(r"(?i)Bearer\s+(.*)$").unwrap(),
            "token",
        )
    }

    fn request(headers: &[(&str, &str)]) -> Request {
        let mut builder = http::Request::builder().uri("/api");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    #[test]
    fn test_bearer_header() {
        let located = locator()
            .locate(&request(&[("authorization", "Bearer abc.def")]))
            .unwrap();
        assert_eq!(located.token, "abc.def");
        assert_eq!(located.source, TokenSource::Header);
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let located = locator()
            .locate(&request(&[("authorization", "bearer xyz")]))
            .unwrap();
        assert_eq!(located.token, "xyz");
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let located = locator()
            .locate(&request(&[
                ("authorization", "Bearer from-header"),
                ("cookie", "token=from-cookie"),
            ]))
            .unwrap();
        assert_eq!(located.token, "from-header");
    }

    #[test]
    fn test_cookie_fallback_when_header_does_not_match() {
        let located = locator()
            .locate(&request(&[
                ("authorization", "Basic dXNlcjpwYXNz"),
                ("cookie", "theme=dark; token=from-cookie"),
            ]))
            .unwrap();
        assert_eq!(located.token, "from-cookie");
        assert_eq!(located.source, TokenSource::Cookie);
    }

    #[test]
    fn test_only_first_header_value_is_used() {
        let located = locator()
            .locate(&request(&[
                ("authorization", "Basic abc"),
                ("authorization", "Bearer second"),
                ("cookie", "token=cookie"),
            ]))
            .unwrap();
        assert_eq!(located.source, TokenSource::Cookie);
    }

    #[test]
    fn test_not_found() {
        let err = locator().locate(&request(&[])).unwrap_err();
        assert!(matches!(err, GateError::TokenNotFound));
    }

    #[test]
    fn test_custom_header_and_pattern() {
        let locator = TokenLocator::new(
            HeaderName::from_static("x-token"),
            Regex::new(r"(.*)").unwrap(),
            "session",
        );
        assert_eq!(locator.header().as_str(), "x-token");
        assert_eq!(locator.cookie(), "session");

        let located = locator.locate(&request(&[("x-token", "raw")])).unwrap();
        assert_eq!(located.token, "raw");
    }

    #[test]
    fn test_non_participating_group_is_no_match() {
        let locator = TokenLocator::new(
            header::AUTHORIZATION,
            Regex::new(r"^Token(?:\s+(\w+))?$").unwrap(),
            "token",
        );

        let err = locator
            .locate(&request(&[("authorization", "Token")]))
            .unwrap_err();
        assert!(matches!(err, GateError::TokenNotFound));
    }

    #[test]
    fn test_token_source_display() {
        assert_eq!(TokenSource::Header.to_string(), "header");
        assert_eq!(TokenSource::Cookie.as_str(), "cookie");
    }
}
