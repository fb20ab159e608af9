//! Prometheus metrics for gate decisions.
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `tollgate_decisions_total` | Counter | `outcome` | Requests by pipeline outcome |
//! | `tollgate_credential_failures_total` | Counter | `reason` | Rejected credentials by cause |
//!
//! Recording functions are cheap no-ops until a recorder is installed with
//! [`init_metrics`].

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// How the gate disposed of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Rules decided the request does not need authentication.
    Skipped,
    /// A valid credential was presented and the request passed the hooks
    /// and downstream.
    Authenticated,
    /// The credential was missing or invalid.
    Rejected,
    /// The request was refused by the transport-security gate.
    Insecure,
}

impl Outcome {
    /// Label value for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Authenticated => "authenticated",
            Self::Rejected => "rejected",
            Self::Insecure => "insecure",
        }
    }
}

/// Installs the Prometheus recorder.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);

    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        "tollgate_decisions_total",
        "Requests processed by the gate, by outcome"
    );
    describe_counter!(
        "tollgate_credential_failures_total",
        "Rejected credentials, by failure reason"
    );
}

/// Records the outcome of one pass through the gate.
pub fn record_decision(outcome: Outcome) {
    counter!("tollgate_decisions_total", "outcome" => outcome.as_str()).increment(1);
}

/// Records a rejected credential.
///
/// `reason` is a short, stable label such as `"not_found"` or `"invalid"`.
pub fn record_credential_failure(reason: &'static str) {
    counter!("tollgate_credential_failures_total", "reason" => reason).increment(1);
}
