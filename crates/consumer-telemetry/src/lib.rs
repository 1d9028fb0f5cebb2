//! # Consumer Telemetry
//!
//! Observability for the process-consumer client.
//!
//! ## Components
//!
//! - **Logs**: `tracing` with an `EnvFilter`, JSON for containers or pretty
//!   output for development
//! - **Metrics**: Prometheus counters and histograms in a global registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use consumer_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PC_SERVICE_NAME` | `process-consumer` | Service name in logs |
//! | `PC_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `PC_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `PC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `PC_METRICS_PORT` | `9100` | Port a host process exposes metrics on |

mod config;
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    gather_metrics, register_metrics, HistogramTimer, MetricsHandle, AUTH_LOGINS,
    ENGINE_MESSAGES_RECEIVED, OPERATION_DURATION, OPERATION_ERRORS, PROCESSES_ENDED,
    PROCESSES_STARTED, USER_TASKS_COMPLETED, USER_TASKS_RENDERED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and metrics.
///
/// Fails if a global tracing subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first; the registry is idempotent
    let metrics_handle = register_metrics()?;

    tracing_setup::init_tracing(config)?;

    tracing::info!(
        service = %config.service_name,
        metrics_port = config.metrics_port,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Start timing an operation. Observation happens on drop.
#[macro_export]
macro_rules! time_operation {
    ($operation:expr) => {
        $crate::metrics::HistogramTimer::new(
            &$crate::metrics::OPERATION_DURATION.with_label_values(&[$operation]),
        )
    };
}
