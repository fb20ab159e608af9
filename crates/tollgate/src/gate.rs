//! The request pipeline.
//!
//! ```text
//! ENTRY ── rules say skip ──────────────────────────────► downstream
//!   │
//!   ▼
//! TRANSPORT ── insecure ────────────────────────────────► Err(InsecureTransport)
//!   │
//!   ▼
//! LOCATE ── not found ─┐
//!   │                  ├─► 401 ─► error hook ──────────► Ok(response)
//!   ▼                  │
//! DECODE ── rejected ──┘
//!   │
//!   ▼
//! ATTACH ─► before hook ─► downstream ─► after hook ────► Ok(response)
//! ```

use crate::codec::{Decoded, TokenCodec};
use crate::config::GateConfig;
use crate::error::{GateError, GateResult};
use crate::hooks::{ErrorContext, TokenContext};
use crate::locator::Located;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, RequestExt, Response, ResponseExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tollgate_telemetry::{record_credential_failure, record_decision, Outcome};

/// Bearer-token gate in front of a downstream handler.
///
/// Cheap to clone; all state is shared and immutable.
///
/// # Example
///
/// ```
/// use tollgate::codec::{CodecError, Decoded, FnCodec};
/// use tollgate::{Gate, GateConfig, RequestExt, Response};
/// use http::StatusCode;
///
/// # tokio_test::block_on(async {
/// let codec = FnCodec::new(|_secret, token, _ttl| match token {
///     "valid" => Ok(Decoded::new("alice")),
///     _ => Err(CodecError::new("Invalid token")),
/// });
/// let gate = Gate::new(GateConfig::builder("k").build().unwrap(), codec);
///
/// let request = http::Request::get("https://example.com/api")
///     .header("authorization", "Bearer valid")
///     .body(Default::default())
///     .unwrap();
///
/// let response = gate
///     .process(request, |request| async move {
///         let user = request.attribute("token").unwrap().to_str().unwrap().to_string();
///         Response::new(user.into())
///     })
///     .await
///     .unwrap();
/// assert_eq!(response.status(), StatusCode::OK);
/// # });
/// ```
#[derive(Clone)]
pub struct Gate {
    config: Arc<GateConfig>,
    codec: Arc<dyn TokenCodec>,
}

impl Gate {
    /// Creates a gate from a configuration and a codec.
    pub fn new(config: GateConfig, codec: impl TokenCodec) -> Self {
        Self::with_shared_codec(config, Arc::new(codec))
    }

    /// Creates a gate with a codec shared with other components.
    pub fn with_shared_codec(config: GateConfig, codec: Arc<dyn TokenCodec>) -> Self {
        Self {
            config: Arc::new(config),
            codec,
        }
    }

    /// The gate configuration.
    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Evaluates the rule chain for `request`.
    #[must_use]
    pub fn should_authenticate(&self, request: &Request) -> bool {
        self.config.rules.should_authenticate(request)
    }

    /// Runs `request` through the gate and, when allowed, `downstream`.
    ///
    /// Returns the downstream response for skipped and authenticated
    /// requests, or the unauthorized response for credential failures.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InsecureTransport`] when authentication is
    /// required over plain HTTP to a host that is not relaxed, and
    /// [`GateError::Hook`] when a hook fails.
    pub async fn process<H, Fut>(&self, request: Request, downstream: H) -> GateResult<Response>
    where
        H: FnOnce(Request) -> Fut + Send,
        Fut: Future<Output = Response> + Send,
    {
        self.run(request, move |request| {
            let response = downstream(request);
            async move { Ok(response.await) }
        })
        .await
    }

    async fn run<H, Fut>(&self, request: Request, downstream: H) -> GateResult<Response>
    where
        H: FnOnce(Request) -> Fut + Send,
        Fut: Future<Output = GateResult<Response>> + Send,
    {
        if !self.should_authenticate(&request) {
            self.log(|| {
                tracing::debug!(
                    method = %request.method(),
                    path = request.path(),
                    "Authentication not required"
                );
            });
            record_decision(Outcome::Skipped);
            return downstream(request).await;
        }

        if let Err(err) = self.config.transport.enforce(&request) {
            self.log(|| {
                tracing::error!(
                    scheme = request.scheme(),
                    host = request.host().unwrap_or_default(),
                    "{err}"
                );
            });
            record_decision(Outcome::Insecure);
            return Err(err);
        }

        let Located { token, .. } = match self.log(|| self.config.locator.locate(&request)) {
            Ok(located) => located,
            Err(err) => return self.reject(request, &err, None).await,
        };

        let decoded = match self.decode(&token).await {
            Ok(decoded) => decoded,
            Err(err) => return self.reject(request, &err, Some(token)).await,
        };

        let context = TokenContext { decoded, token };
        let mut request = request;
        if let Some(name) = self.config.attribute() {
            request = request.with_attribute(name, context.decoded.clone());
        }
        if let Some(before) = &self.config.before {
            request = before.before(request, context.clone()).await?;
        }

        let mut response = downstream(request).await?;

        if let Some(after) = &self.config.after {
            response = after.after(response, context).await?;
        }
        record_decision(Outcome::Authenticated);
        Ok(response)
    }

    async fn decode(&self, token: &str) -> GateResult<Decoded> {
        let result = self
            .codec
            .decode(&self.config.secret, token, self.config.ttl)
            .await;

        result.map_err(|err| {
            self.log(|| tracing::warn!(token, reason = %err, "Token rejected by codec"));
            GateError::credential(err.message)
        })
    }

    async fn reject(
        &self,
        request: Request,
        err: &GateError,
        token: Option<String>,
    ) -> GateResult<Response> {
        record_decision(Outcome::Rejected);
        record_credential_failure(err.reason());

        let baseline = Response::unauthorized();
        let Some(hook) = &self.config.error else {
            return Ok(baseline);
        };

        let context = ErrorContext {
            message: err.to_string(),
            token,
        };
        Ok(hook.on_error(request, baseline, context).await?)
    }

    fn log<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.config.logger {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Middleware for Gate {
    fn name(&self) -> &'static str {
        "tollgate"
    }

    fn process<'a>(
        &'a self,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, GateResult<Response>> {
        Box::pin(self.run(request, move |request| next.run(request)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecError, FnCodec, Secret};
    use crate::hooks::HookError;
    use bytes::Bytes;
    use http::{Method, StatusCode};
    use http_body_util::{BodyExt, Full};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn codec() -> FnCodec<impl Fn(&Secret, &str, Option<u32>) -> Result<Decoded, CodecError>> {
        FnCodec::new(|_secret: &Secret, token: &str, _ttl: Option<u32>| {
            token
                .strip_prefix("ok:")
                .map(|payload| Decoded::new(payload.to_string()))
                .ok_or_else(|| CodecError::new("Invalid token"))
        })
    }

    fn request(method: Method, uri: &str, authorization: Option<&str>) -> Request {
        let mut builder = http::Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    async fn echo(request: Request) -> Response {
        let body = request
            .attribute("token")
            .map(|decoded| decoded.clone().into_bytes())
            .unwrap_or_default();
        Response::new(Full::new(body))
    }

    async fn body(response: Response) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_authenticated_request_reaches_downstream() {
        let gate = Gate::new(GateConfig::builder("k").build().unwrap(), codec());

        let response = gate
            .process(request(Method::GET, "https://example.com/api", Some("Bearer ok:alice")), echo)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, Bytes::from("alice"));
    }

    #[tokio::test]
    async fn test_skipped_request_is_untouched() {
        let gate = Gate::new(GateConfig::builder("k").build().unwrap(), codec());
        let called = AtomicUsize::new(0);

        let response = gate
            .process(request(Method::OPTIONS, "http://example.com/api", None), |req| {
                called.fetch_add(1, Ordering::SeqCst);
                echo(req)
            })
            .await
            .unwrap();

        assert_eq!(called.load(Ordering::SeqCst), 1);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_insecure_transport_is_fatal() {
        let gate = Gate::new(GateConfig::builder("k").build().unwrap(), codec());

        let err = gate
            .process(request(Method::GET, "http://example.com/api", Some("Bearer ok:a")), echo)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::InsecureTransport { .. }));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let gate = Gate::new(GateConfig::builder("k").build().unwrap(), codec());

        let response = gate
            .process(request(Method::GET, "https://example.com/api", None), echo)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_codec_message_reaches_error_hook() {
        let config = GateConfig::builder("k")
            .error(|_request: Request, response: Response, context: ErrorContext| async move {
                assert_eq!(context.message, "Invalid token");
                assert_eq!(context.token.as_deref(), Some("tampered"));
                Ok(response)
            })
            .build()
            .unwrap();
        let gate = Gate::new(config, codec());

        let response = gate
            .process(request(Method::GET, "https://example.com/api", Some("Bearer tampered")), echo)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_hook_failure_propagates() {
        let config = GateConfig::builder("k")
            .before(|_request: Request, _context: TokenContext| async {
                Err(HookError::new("before failed"))
            })
            .build()
            .unwrap();
        let gate = Gate::new(config, codec());

        let err = gate
            .process(request(Method::GET, "https://example.com/api", Some("Bearer ok:a")), echo)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Hook(ref hook) if hook.message == "before failed"));
    }

    #[tokio::test]
    async fn test_attribute_disabled() {
        let config = GateConfig::builder("k").attribute("").build().unwrap();
        let gate = Gate::new(config, codec());

        let response = gate
            .process(request(Method::GET, "https://example.com/api", Some("Bearer ok:a")), echo)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.is_empty());
    }

    #[test]
    fn test_gate_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Gate>();
    }
}
