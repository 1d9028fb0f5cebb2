//! Engine event listener feeding the Prometheus metrics.

use consumer_telemetry::{
    log_process_event, log_task_event, metric_inc, ENGINE_MESSAGES_RECEIVED, PROCESSES_ENDED,
    USER_TASKS_RENDERED,
};
use pc_02_process_engine::{EngineEvent, EngineEventListener};

const SUBSYSTEM: &str = "process_engine";

/// Counts and logs every engine event.
#[derive(Debug, Default)]
pub struct TelemetryListener;

impl EngineEventListener for TelemetryListener {
    fn on_event(&self, event: &EngineEvent) {
        metric_inc!(ENGINE_MESSAGES_RECEIVED);

        match event {
            EngineEvent::RenderUserTask(task) => {
                metric_inc!(USER_TASKS_RENDERED);
                log_task_event!(
                    debug,
                    SUBSYSTEM,
                    "User task ready",
                    task.id,
                    renderable = task.is_renderable()
                );
            }
            EngineEvent::ProcessEnd(Some(process_instance_id)) => {
                metric_inc!(PROCESSES_ENDED, &["determined"]);
                log_process_event!(info, SUBSYSTEM, "Process ended", process_instance_id);
            }
            EngineEvent::ProcessEnd(None) => {
                metric_inc!(PROCESSES_ENDED, &["undetermined"]);
            }
            EngineEvent::Channel { .. } => {}
        }
    }
}
