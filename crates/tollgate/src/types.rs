//! Request and response types used by the gate.
//!
//! Requests and responses are plain `http` types with a `Full<Bytes>` body.
//! [`RequestExt`] is the small read capability the pipeline needs from a
//! request: method, scheme, host, path, headers, cookies and named
//! attributes.

use crate::codec::Decoded;
use crate::cookie::Cookies;
use bytes::Bytes;
use http::{header, StatusCode};
use http_body_util::Full;
use std::collections::HashMap;

/// The HTTP request type used in the gate pipeline.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the gate pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Transport scheme of a request whose URI is not in absolute form.
///
/// Servers see origin-form URIs (`/api/users`) and therefore no scheme. The
/// serving layer records the scheme of the connection by inserting this
/// value into the request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain-text HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    /// Lowercase scheme name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Named values attached to a request by the gate.
///
/// Stored in the request extensions; read through [`RequestExt::attribute`].
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    values: HashMap<String, Decoded>,
}

impl Attributes {
    /// Returns the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Decoded> {
        self.values.get(name)
    }

    /// Stores `value` under `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Decoded) {
        self.values.insert(name.into(), value);
    }

    /// Number of stored attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no attribute is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read capability over an HTTP request.
pub trait RequestExt {
    /// The request scheme: URI scheme, else the [`Scheme`] extension, else `http`.
    fn scheme(&self) -> &str;

    /// The request host: URI host, else the `Host` header without its port.
    fn host(&self) -> Option<&str>;

    /// The request path.
    fn path(&self) -> &str;

    /// First value of header `name`, or the empty string.
    fn first_header(&self, name: &header::HeaderName) -> &str;

    /// Cookies sent with the request.
    fn cookies(&self) -> Cookies;

    /// The attribute stored under `name`, if any.
    fn attribute(&self, name: &str) -> Option<&Decoded>;

    /// Derives a request carrying `value` under `name`.
    #[must_use]
    fn with_attribute(self, name: impl Into<String>, value: Decoded) -> Self
    where
        Self: Sized;
}

impl<B> RequestExt for http::Request<B> {
    fn scheme(&self) -> &str {
        if let Some(scheme) = self.uri().scheme_str() {
            return scheme;
        }
        self.extensions()
            .get::<Scheme>()
            .map_or(Scheme::Http.as_str(), |scheme| scheme.as_str())
    }

    fn host(&self) -> Option<&str> {
        if let Some(host) = self.uri().host() {
            return Some(host);
        }
        let authority = self.headers().get(header::HOST)?.to_str().ok()?;
        Some(strip_port(authority))
    }

    fn path(&self) -> &str {
        self.uri().path()
    }

    fn first_header(&self, name: &header::HeaderName) -> &str {
        self.headers()
            .get_all(name)
            .iter()
            .next()
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }

    fn cookies(&self) -> Cookies {
        Cookies::from_headers(self.headers())
    }

    fn attribute(&self, name: &str) -> Option<&Decoded> {
        self.extensions().get::<Attributes>()?.get(name)
    }

    fn with_attribute(mut self, name: impl Into<String>, value: Decoded) -> Self {
        let mut attributes = self
            .extensions_mut()
            .remove::<Attributes>()
            .unwrap_or_default();
        attributes.insert(name, value);
        self.extensions_mut().insert(attributes);
        self
    }
}

fn strip_port(authority: &str) -> &str {
    if authority.starts_with('[') {
        // IPv6 literal: keep the brackets, drop anything after them
        return authority
            .find(']')
            .map_or(authority, |end| &authority[..=end]);
    }
    authority
        .split_once(':')
        .map_or(authority, |(host, _port)| host)
}

/// Extension trait for building gate responses.
pub trait ResponseExt {
    /// A `401 Unauthorized` response with an empty body.
    fn unauthorized() -> Response;
}

impl ResponseExt for Response {
    fn unauthorized() -> Response {
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::UNAUTHORIZED;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request as HttpRequest;
    use http_body_util::BodyExt;

    fn request(uri: &str) -> Request {
        HttpRequest::builder()
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_scheme_from_absolute_uri() {
        assert_eq!(request("https://example.com/api").scheme(), "https");
        assert_eq!(request("http://example.com/api").scheme(), "http");
    }

    #[test]
    fn test_scheme_from_extension() {
        let mut req = request("/api");
        assert_eq!(req.scheme(), "http");

        req.extensions_mut().insert(Scheme::Https);
        assert_eq!(req.scheme(), "https");
    }

    #[test]
    fn test_host_from_uri_and_header() {
        assert_eq!(request("https://example.com/api").host(), Some("example.com"));

        let req = HttpRequest::builder()
            .uri("/api")
            .header(header::HOST, "localhost:8080")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert_eq!(req.host(), Some("localhost"));

        assert_eq!(request("/api").host(), None);
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("example.com:443"), "example.com");
        assert_eq!(strip_port("[::1]:8080"), "[::1]");
        assert_eq!(strip_port("[::1]"), "[::1]");
    }

    #[test]
    fn test_first_header() {
        let req = HttpRequest::builder()
            .uri("/")
            .header("x-token", "first")
            .header("x-token", "second")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let name = header::HeaderName::from_static("x-token");
        assert_eq!(req.first_header(&name), "first");
        assert_eq!(req.first_header(&header::AUTHORIZATION), "");
    }

    #[test]
    fn test_with_attribute_keeps_existing() {
        let req = request("/")
            .with_attribute("token", Decoded::from_static(b"one"))
            .with_attribute("other", Decoded::from_static(b"two"));

        assert_eq!(req.attribute("token").unwrap().as_bytes(), b"one");
        assert_eq!(req.attribute("other").unwrap().as_bytes(), b"two");
        assert!(req.attribute("missing").is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_response_is_empty() {
        let response = Response::unauthorized();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}
