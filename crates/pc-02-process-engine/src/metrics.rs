//! Metrics hooks for process engine routing
//!
//! Thread-safe counters covering the message flow through the engine facade.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the process engine facade
#[derive(Debug, Default)]
pub struct Metrics {
    /// Bus messages delivered to the engine
    pub messages_received: AtomicU64,
    /// `userTask` notifications turned into widget configurations
    pub tasks_rendered: AtomicU64,
    /// Process instances started through this client
    pub processes_started: AtomicU64,
    /// Process ends whose instance was identified
    pub processes_ended: AtomicU64,
    /// Process ends that arrived without an identifiable instance
    pub processes_ended_undetermined: AtomicU64,
    pub tasks_proceeded: AtomicU64,
    pub tasks_cancelled: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_rendered(&self) {
        self.tasks_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_process_started(&self) {
        self.processes_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a process end
    ///
    /// # Arguments
    /// * `determined` - Whether the ended instance could be identified
    pub fn record_process_ended(&self, determined: bool) {
        if determined {
            self.processes_ended.fetch_add(1, Ordering::Relaxed);
        } else {
            self.processes_ended_undetermined
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_task_proceeded(&self) {
        self.tasks_proceeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_cancelled(&self) {
        self.tasks_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            tasks_rendered: self.tasks_rendered.load(Ordering::Relaxed),
            processes_started: self.processes_started.load(Ordering::Relaxed),
            processes_ended: self.processes_ended.load(Ordering::Relaxed),
            processes_ended_undetermined: self
                .processes_ended_undetermined
                .load(Ordering::Relaxed),
            tasks_proceeded: self.tasks_proceeded.load(Ordering::Relaxed),
            tasks_cancelled: self.tasks_cancelled.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`Metrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_received: u64,
    pub tasks_rendered: u64,
    pub processes_started: u64,
    pub processes_ended: u64,
    pub processes_ended_undetermined: u64,
    pub tasks_proceeded: u64,
    pub tasks_cancelled: u64,
}
