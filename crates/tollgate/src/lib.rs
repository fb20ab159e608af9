//! # Tollgate
//!
//! Bearer-token authentication for `http`-based services.
//!
//! A [`Gate`] sits in front of a downstream handler. For each request it
//! decides whether authentication applies, refuses credentials sent over
//! plain HTTP, locates a token in a header or cookie, hands it to a
//! [`TokenCodec`] and either forwards the request with the decoded payload
//! attached or answers `401 Unauthorized`.
//!
//! ## Pipeline
//!
//! ```text
//! Request → Rules → Transport → Locate → Decode → Attach → Before → Handler
//!             │         │          │        │                          ↓
//!             │         │          └────────┴─► 401 → Error hook       │
//!             │         └─► Err(InsecureTransport)                     │
//!             └─► Handler (skipped)                      Response ← After
//! ```
//!
//! | Stage     | Component            | Failure                                   |
//! |-----------|----------------------|-------------------------------------------|
//! | Rules     | [`RuleChain`]        | none; a `false` skips authentication      |
//! | Transport | [`TransportGate`]    | fatal [`GateError::InsecureTransport`]    |
//! | Locate    | [`TokenLocator`]     | 401 with "Token not found"                |
//! | Decode    | [`TokenCodec`]       | 401 with the codec's message              |
//! | Hooks     | [`hooks`]            | fatal [`GateError::Hook`]                 |
//!
//! ## Example
//!
//! ```
//! use tollgate::codec::{CodecError, Decoded, FnCodec};
//! use tollgate::{Gate, GateConfig, Response};
//! use http::StatusCode;
//!
//! # tokio_test::block_on(async {
//! let codec = FnCodec::new(|_secret, token, _ttl| {
//!     token
//!         .strip_prefix("ok:")
//!         .map(|payload| Decoded::new(payload.to_string()))
//!         .ok_or_else(|| CodecError::new("Invalid token"))
//! });
//!
//! let config = GateConfig::builder("supersecretkeyyoushouldnotcommit")
//!     .path(["/api"])
//!     .build()
//!     .unwrap();
//! let gate = Gate::new(config, codec);
//!
//! let request = http::Request::get("https://example.com/api/users")
//!     .body(Default::default())
//!     .unwrap();
//! let response = gate
//!     .process(request, |_request| async { Response::new(Default::default()) })
//!     .await
//!     .unwrap();
//! assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/tollgate/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod cookie;
pub mod error;
pub mod gate;
pub mod hooks;
pub mod locator;
pub mod middleware;
pub mod rules;
pub mod stack;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use codec::{CodecError, Decoded, FnCodec, Secret, TokenCodec};
pub use config::{GateConfig, GateConfigBuilder};
pub use error::{GateError, GateResult};
pub use gate::Gate;
pub use hooks::{AfterHook, BeforeHook, ErrorContext, ErrorHook, HookError, TokenContext};
pub use locator::{Located, TokenLocator, TokenSource};
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next};
pub use rules::{MethodRule, PathRule, Rule, RuleChain};
pub use stack::{Stack, StackBuilder};
pub use transport::TransportGate;
pub use types::{Attributes, Request, RequestExt, Response, ResponseExt, Scheme};
