//! Extension points around the protected handler.
//!
//! Three hooks customize the pipeline:
//!
//! - **before** runs after a token is accepted and may replace the request
//!   handed downstream.
//! - **after** runs on the downstream response and may replace it.
//! - **error** runs when a token is missing or rejected and may replace the
//!   baseline `401 Unauthorized` response.
//!
//! Hooks are async. A failing hook aborts the pipeline with
//! [`GateError::Hook`](crate::GateError::Hook).
//!
//! # Example
//!
//! ```
//! use tollgate::hooks::FnAfter;
//! use http::HeaderValue;
//!
//! let after = FnAfter::new(|mut response: tollgate::Response, context: tollgate::TokenContext| async move {
//!     let value = HeaderValue::from_str(&context.token).map_err(tollgate::HookError::from_error)?;
//!     response.headers_mut().insert("x-token", value);
//!     Ok::<_, tollgate::HookError>(response)
//! });
//! # let _ = after;
//! ```

use crate::codec::Decoded;
use crate::middleware::BoxFuture;
use crate::types::{Request, Response};
use std::fmt;
use std::future::Future;
use thiserror::Error;

/// Error returned by a failing hook.
#[derive(Debug, Error)]
#[error("Hook error: {message}")]
pub struct HookError {
    /// Error message
    pub message: String,
    /// Optional source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HookError {
    /// Creates a new hook error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a hook error with a source.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wraps any error, using its display text as the message.
    pub fn from_error(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::with_source(source.to_string(), source)
    }
}

/// What a successful authentication produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenContext {
    /// Codec output.
    pub decoded: Decoded,
    /// The raw token as located.
    pub token: String,
}

/// Why authentication failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Human-readable failure message.
    pub message: String,
    /// The token, when one was located before the failure.
    pub token: Option<String>,
}

/// Runs after a token is accepted, before the downstream handler.
pub trait BeforeHook: Send + Sync + 'static {
    /// Returns the request to hand downstream.
    fn before<'a>(
        &'a self,
        request: Request,
        context: TokenContext,
    ) -> BoxFuture<'a, Result<Request, HookError>>;
}

/// Runs on the downstream response of an authenticated request.
pub trait AfterHook: Send + Sync + 'static {
    /// Returns the response to hand upstream.
    fn after<'a>(
        &'a self,
        response: Response,
        context: TokenContext,
    ) -> BoxFuture<'a, Result<Response, HookError>>;
}

/// Runs when authentication fails.
pub trait ErrorHook: Send + Sync + 'static {
    /// Returns the response to send instead of the downstream handler's.
    ///
    /// `response` is the baseline `401` with an empty body.
    fn on_error<'a>(
        &'a self,
        request: Request,
        response: Response,
        context: ErrorContext,
    ) -> BoxFuture<'a, Result<Response, HookError>>;
}

/// A before hook built from an async function.
pub struct FnBefore<F> {
    func: F,
}

impl<F, Fut> FnBefore<F>
where
    F: Fn(Request, TokenContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Request, HookError>> + Send + 'static,
{
    /// Creates a before hook from `func`.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> BeforeHook for FnBefore<F>
where
    F: Fn(Request, TokenContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Request, HookError>> + Send + 'static,
{
    fn before<'a>(
        &'a self,
        request: Request,
        context: TokenContext,
    ) -> BoxFuture<'a, Result<Request, HookError>> {
        Box::pin((self.func)(request, context))
    }
}

/// An after hook built from an async function.
pub struct FnAfter<F> {
    func: F,
}

impl<F, Fut> FnAfter<F>
where
    F: Fn(Response, TokenContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HookError>> + Send + 'static,
{
    /// Creates an after hook from `func`.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> AfterHook for FnAfter<F>
where
    F: Fn(Response, TokenContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HookError>> + Send + 'static,
{
    fn after<'a>(
        &'a self,
        response: Response,
        context: TokenContext,
    ) -> BoxFuture<'a, Result<Response, HookError>> {
        Box::pin((self.func)(response, context))
    }
}

/// An error hook built from an async function.
pub struct FnError<F> {
    func: F,
}

impl<F, Fut> FnError<F>
where
    F: Fn(Request, Response, ErrorContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HookError>> + Send + 'static,
{
    /// Creates an error hook from `func`.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> ErrorHook for FnError<F>
where
    F: Fn(Request, Response, ErrorContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HookError>> + Send + 'static,
{
    fn on_error<'a>(
        &'a self,
        request: Request,
        response: Response,
        context: ErrorContext,
    ) -> BoxFuture<'a, Result<Response, HookError>> {
        Box::pin((self.func)(request, response, context))
    }
}

macro_rules! opaque_debug {
    ($($name:ident),*) => {
        $(
            impl<F> fmt::Debug for $name<F> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($name)).finish_non_exhaustive()
                }
            }
        )*
    };
}

opaque_debug!(FnBefore, FnAfter, FnError);
