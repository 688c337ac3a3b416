//! Task debug telemetry.
//!
//! Every decision a task type makes about an observation can be reported to a
//! [`DebugSink`]. Recording never fails and never changes what the task does.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

/// One structured debug line
#[derive(Debug, Clone, Copy)]
pub struct DebugEntry<'a> {
    pub task_type: &'a str,
    pub message: &'a str,
    pub quest_id: &'a str,
    pub task_id: &'a str,
    pub player_id: Uuid,
}

/// Receiver of task debug lines
pub trait DebugSink: Send + Sync {
    fn record(&self, entry: &DebugEntry<'_>);
}

/// Emits entries as `tracing` debug events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDebugSink;

impl DebugSink for TracingDebugSink {
    fn record(&self, entry: &DebugEntry<'_>) {
        tracing::debug!(
            target: "quest_tracker::task",
            task_type = entry.task_type,
            quest_id = entry.quest_id,
            task_id = entry.task_id,
            player_id = %entry.player_id,
            "{}",
            entry.message
        );
    }
}

/// Switchable front for a debug sink
pub struct Telemetry {
    sink: Arc<dyn DebugSink>,
    enabled: AtomicBool,
}

impl Telemetry {
    pub fn new(sink: Arc<dyn DebugSink>, enabled: bool) -> Self {
        Self {
            sink,
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn record(&self, entry: &DebugEntry<'_>) {
        if self.is_enabled() {
            self.sink.record(entry);
        }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(Arc::new(TracingDebugSink), true)
    }
}
