//! Progress handler trait and events

use crate::pipeline::{Stage, TaskResult};
use std::time::Duration;

/// Events emitted while a run moves through its stages
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started
    Started { sources_dir: String },

    StageStarted { stage: Stage },

    /// Stage not attempted
    StageSkipped { stage: Stage, reason: String },

    StageComplete {
        stage: Stage,
        failed: bool,
        duration: Duration,
    },

    /// Run finished with its final decision
    Completed {
        result: TaskResult,
        total_time: Duration,
    },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
