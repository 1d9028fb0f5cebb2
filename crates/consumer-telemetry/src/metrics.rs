//! Prometheus metrics for the process-consumer client.
//!
//! All metrics follow the naming convention: `pc_<subsystem>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec,
    Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // PROCESS ENGINE METRICS
    // =========================================================================

    /// Bus messages routed by the engine
    pub static ref ENGINE_MESSAGES_RECEIVED: Counter = Counter::new(
        "pc_engine_messages_received_total",
        "Total bus messages routed by the process engine"
    ).expect("metric creation failed");

    /// User tasks rendered from bus notifications
    pub static ref USER_TASKS_RENDERED: Counter = Counter::new(
        "pc_engine_user_tasks_rendered_total",
        "Total user tasks turned into widget configurations"
    ).expect("metric creation failed");

    /// Process instances started through this client
    pub static ref PROCESSES_STARTED: Counter = Counter::new(
        "pc_engine_processes_started_total",
        "Total process instances started"
    ).expect("metric creation failed");

    /// Process ends by whether the instance could be identified
    pub static ref PROCESSES_ENDED: CounterVec = CounterVec::new(
        Opts::new("pc_engine_processes_ended_total", "Total process ends observed"),
        &["outcome"]  // determined / undetermined
    ).expect("metric creation failed");

    /// User tasks completed by this client
    pub static ref USER_TASKS_COMPLETED: CounterVec = CounterVec::new(
        Opts::new("pc_engine_user_tasks_completed_total", "Total user tasks completed"),
        &["action"]  // proceed / cancel
    ).expect("metric creation failed");

    // =========================================================================
    // AUTHENTICATION METRICS
    // =========================================================================

    pub static ref AUTH_LOGINS: CounterVec = CounterVec::new(
        Opts::new("pc_auth_logins_total", "Login attempts"),
        &["outcome"]  // success / failure
    ).expect("metric creation failed");

    // =========================================================================
    // CLIENT OPERATION METRICS
    // =========================================================================

    /// Duration of client operations against the remote engine
    pub static ref OPERATION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "pc_engine_operation_duration_seconds",
            "Time spent in client operations"
        ).buckets(exponential_buckets(0.001, 2.0, 14).expect("valid buckets")),
        &["operation"]
    ).expect("metric creation failed");

    /// Failed client operations
    pub static ref OPERATION_ERRORS: CounterVec = CounterVec::new(
        Opts::new("pc_engine_operation_errors_total", "Errors by operation"),
        &["operation"]
    ).expect("metric creation failed");
}

/// Handle to the registry the metrics live in.
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered metrics are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Process engine
        Box::new(ENGINE_MESSAGES_RECEIVED.clone()),
        Box::new(USER_TASKS_RENDERED.clone()),
        Box::new(PROCESSES_STARTED.clone()),
        Box::new(PROCESSES_ENDED.clone()),
        Box::new(USER_TASKS_COMPLETED.clone()),
        // Authentication
        Box::new(AUTH_LOGINS.clone()),
        // Client operations
        Box::new(OPERATION_DURATION.clone()),
        Box::new(OPERATION_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}
