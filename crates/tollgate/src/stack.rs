//! Ordered middleware composition.
//!
//! A [`Stack`] runs its middleware in insertion order, then the handler.
//! The order is fixed when the stack is built.
//!
//! ```text
//! Request ──► layer 1 ──► layer 2 ──► ... ──► handler
//!                                               │
//! Response ◄── layer 1 ◄── layer 2 ◄── ... ◄───┘
//! ```

use crate::error::GateResult;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Boxed middleware for dynamic dispatch.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A fixed sequence of middleware in front of a handler.
#[derive(Clone, Default)]
pub struct Stack {
    layers: Vec<BoxedMiddleware>,
}

impl Stack {
    /// Creates a new stack builder.
    #[must_use]
    pub fn builder() -> StackBuilder {
        StackBuilder::new()
    }

    /// Processes a request through every layer, then `handler`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error raised by a layer.
    pub async fn process<H, Fut>(&self, request: Request, handler: H) -> GateResult<Response>
    where
        H: FnOnce(Request) -> Fut + Send,
        Fut: Future<Output = Response> + Send,
    {
        let next = self.build_chain(move |request| Box::pin(handler(request)));
        next.run(request).await
    }

    // Built back to front so the first layer runs first.
    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(Request) -> BoxFuture<'a, Response> + Send + 'a,
    {
        self.layers
            .iter()
            .rev()
            .fold(Next::handler(handler), |next, layer| {
                Next::new(layer.as_ref(), next)
            })
    }

    /// Returns the names of all layers in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    /// Returns the number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the stack has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("layers", &self.names())
            .finish()
    }
}

/// Builder for constructing a [`Stack`].
#[derive(Default)]
pub struct StackBuilder {
    layers: Vec<BoxedMiddleware>,
}

impl StackBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer.
    #[must_use]
    pub fn layer<M: Middleware>(mut self, middleware: M) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Appends a shared layer.
    #[must_use]
    pub fn shared_layer(mut self, middleware: BoxedMiddleware) -> Self {
        self.layers.push(middleware);
        self
    }

    /// Builds the stack.
    #[must_use]
    pub fn build(self) -> Stack {
        Stack {
            layers: self.layers,
        }
    }
}
