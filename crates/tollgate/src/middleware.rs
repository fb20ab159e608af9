//! Core middleware trait and types.
//!
//! A [`Middleware`] receives the incoming request and a [`Next`] callback for
//! the rest of the chain. The gate is one such middleware; it can also run
//! standalone through [`Gate::process`](crate::Gate::process).
//!
//! # Example
//!
//! ```
//! use tollgate::{BoxFuture, GateResult, Middleware, Next, Request, Response};
//!
//! struct Logging;
//!
//! impl Middleware for Logging {
//!     fn name(&self) -> &'static str {
//!         "logging"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, GateResult<Response>> {
//!         Box::pin(async move {
//!             tracing::info!(path = request.uri().path(), "request");
//!             next.run(request).await
//!         })
//!     }
//! }
//! ```

use crate::error::GateResult;
use crate::types::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core middleware trait.
///
/// # Invariants
///
/// - Middleware calls `next.run()` at most once; not calling it short-circuits
///   the chain with the middleware's own response.
/// - Fatal errors from downstream middleware are propagated, not swallowed.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs.
    fn name(&self) -> &'static str;

    /// Process the request, calling `next` to continue the chain.
    fn process<'a>(&'a self, request: Request, next: Next<'a>)
        -> BoxFuture<'a, GateResult<Response>>;
}

/// Callback to invoke the next middleware in the chain.
///
/// Consumed by [`Next::run`], so it can only be called once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More middleware to process
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain - invoke the handler
    Handler(Box<dyn FnOnce(Request) -> BoxFuture<'a, Response> + Send + 'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke `middleware`, then `next`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(Request) -> BoxFuture<'a, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next middleware or handler in the chain.
    pub async fn run(self, request: Request) -> GateResult<Response> {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(request, *next).await,
            NextInner::Handler(handler) => Ok(handler(request).await),
        }
    }
}

/// A middleware built from a function.
///
/// # Example
///
/// ```
/// use tollgate::{FnMiddleware, Scheme};
///
/// // Marks every request as having arrived over TLS.
/// let tls = FnMiddleware::new("tls", |mut request, next| {
///     request.extensions_mut().insert(Scheme::Https);
///     Box::pin(async move { next.run(request).await })
/// });
/// # let _ = tls;
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> BoxFuture<'a, GateResult<Response>>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new function-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> BoxFuture<'a, GateResult<Response>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, GateResult<Response>> {
        (self.func)(request, next)
    }
}
