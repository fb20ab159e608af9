//! Request cookie parsing.

use http::{header, HeaderMap};
use std::collections::HashMap;

/// Cookies sent with a request.
///
/// Parsed from every `Cookie` header. When a name repeats, the first
/// occurrence wins.
///
/// # Example
///
/// ```
/// use http::{header, HeaderMap, HeaderValue};
/// use tollgate::cookie::Cookies;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, HeaderValue::from_static("token=abc123; theme=dark"));
///
/// let cookies = Cookies::from_headers(&headers);
/// assert_eq!(cookies.get("token"), Some("abc123"));
/// assert_eq!(cookies.get("theme"), Some("dark"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    cookies: HashMap<String, String>,
}

impl Cookies {
    /// Create an empty cookie map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse all `Cookie` headers in `headers`.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::new();
        for value in headers.get_all(header::COOKIE) {
            if let Ok(value) = value.to_str() {
                cookies.parse_into(value);
            }
        }
        cookies
    }

    fn parse_into(&mut self, header_value: &str) {
        for cookie in header_value.split(';') {
            let cookie = cookie.trim();
            if let Some((name, value)) = cookie.split_once('=') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let value = unquote(value.trim());
                self.cookies
                    .entry(name.to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
    }

    /// Get a cookie value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Check if a cookie exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Get the number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Check if there are no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Strips one pair of surrounding double quotes.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(values: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(header::COOKIE, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_parse_single_header() {
        let cookies = Cookies::from_headers(&headers(&["a=1; b=2"]));
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies.get("a"), Some("1"));
        assert_eq!(cookies.get("b"), Some("2"));
    }

    #[test]
    fn test_parse_multiple_headers() {
        let cookies = Cookies::from_headers(&headers(&["a=1", "token=xyz"]));
        assert_eq!(cookies.get("token"), Some("xyz"));
        assert!(cookies.contains("a"));
    }

    #[test]
    fn test_quoted_value() {
        let cookies = Cookies::from_headers(&headers(&["token=\"quoted\""]));
        assert_eq!(cookies.get("token"), Some("quoted"));
    }

    #[test]
    fn test_unbalanced_quotes_are_kept() {
        let cookies = Cookies::from_headers(&headers(&["a=\"abc; b=abc\"; c=\"; d=\"\"\"x\"\""]));
        assert_eq!(cookies.get("a"), Some("\"abc"));
        assert_eq!(cookies.get("b"), Some("abc\""));
        assert_eq!(cookies.get("c"), Some("\""));
        assert_eq!(cookies.get("d"), Some("\"\"x\""));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let cookies = Cookies::from_headers(&headers(&["token=first; token=second"]));
        assert_eq!(cookies.get("token"), Some("first"));
    }

    #[test]
    fn test_malformed_pairs_are_skipped() {
        let cookies = Cookies::from_headers(&headers(&["novalue; =orphan; ok=1"]));
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get("ok"), Some("1"));
    }

    #[test]
    fn test_empty_value_is_present() {
        let cookies = Cookies::from_headers(&headers(&["token="]));
        assert_eq!(cookies.get("token"), Some(""));
    }

    #[test]
    fn test_no_cookie_header() {
        assert!(Cookies::from_headers(&HeaderMap::new()).is_empty());
    }
}
