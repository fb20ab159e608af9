//! Structured logging setup.
//!
//! The gate emits its events through `tracing`. [`build_dispatch`] turns a
//! [`LogConfig`] into a `tracing::Dispatch` rendering them as JSON
//! (production) or human-readable text (development). The dispatch can be
//! handed to a single gate through its `logger` option, or installed
//! process-wide with [`init_logging`].
//!
//! # Example
//!
//! ```
//! use tollgate_telemetry::logging::{build_dispatch, LogConfig};
//!
//! let dispatch = build_dispatch(&LogConfig::development()).unwrap();
//! tracing::dispatcher::with_default(&dispatch, || {
//!     tracing::debug!(source = "header", "Using token from request header");
//! });
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing::Dispatch;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type OutputLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g. "info", "tollgate=debug,warn").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span close events.
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Human-readable output with debug events from the gate.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "tollgate=debug,info".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            include_target: true,
        }
    }

    /// JSON output at info level.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            include_target: true,
        }
    }

    /// Shorthand for [`build_dispatch`].
    pub fn dispatch(&self) -> TelemetryResult<Dispatch> {
        build_dispatch(self)
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Builds a dispatch writing to stdout.
///
/// A disabled config yields a dispatch that drops every event.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter directive is invalid.
pub fn build_dispatch(config: &LogConfig) -> TelemetryResult<Dispatch> {
    build_dispatch_with_writer(config, std::io::stdout)
}

/// Builds a dispatch writing to `writer`.
pub fn build_dispatch_with_writer<W>(config: &LogConfig, writer: W) -> TelemetryResult<Dispatch>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if !config.enabled {
        return Ok(Dispatch::none());
    }

    let filter = create_env_filter(&config.level)?;
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_span_events(config.span_events())
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_target(config.include_target);

    let output: OutputLayer = if config.json_format {
        layer.json().boxed()
    } else {
        layer.pretty().boxed()
    };

    let subscriber = tracing_subscriber::registry().with(output).with(filter);
    Ok(Dispatch::new(subscriber))
}

/// Installs the dispatch described by `config` as the global default.
///
/// Does nothing when `config.enabled` is false.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter is invalid or a global
/// subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    tracing::dispatcher::set_global_default(build_dispatch(config)?)
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns error if the filter string is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}
