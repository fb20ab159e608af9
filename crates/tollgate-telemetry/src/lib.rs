//! Observability for the tollgate authentication pipeline.
//!
//! - **Logging**: JSON or pretty `tracing` dispatches, per gate or global
//! - **Metrics**: gate decision counters exported in Prometheus format
//!
//! # Example
//!
//! ```rust,ignore
//! use tollgate_telemetry::{init_logging, init_metrics, LogConfig, MetricsConfig};
//!
//! init_logging(&LogConfig::production())?;
//! init_metrics(&MetricsConfig::default())?;
//! ```

#![doc(html_root_url = "https://docs.rs/tollgate-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{build_dispatch, build_dispatch_with_writer, init_logging, LogConfig};
pub use metrics::{init_metrics, record_credential_failure, record_decision, render_metrics, MetricsConfig, Outcome};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
