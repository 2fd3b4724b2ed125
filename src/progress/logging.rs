//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use crate::pipeline::TaskResult;
use tracing::{info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { sources_dir } => {
                info!(sources = %sources_dir, "Starting build step");
            }
            ProgressEvent::StageStarted { stage } => {
                info!(stage = %stage, "Starting stage");
            }
            ProgressEvent::StageSkipped { stage, reason } => {
                info!(stage = %stage, reason = %reason, "Skipping stage");
            }
            ProgressEvent::StageComplete {
                stage,
                failed,
                duration,
            } => {
                if *failed {
                    warn!(
                        stage = %stage,
                        duration_ms = duration.as_millis(),
                        "Stage failed"
                    );
                } else {
                    info!(
                        stage = %stage,
                        duration_ms = duration.as_millis(),
                        "Stage complete"
                    );
                }
            }
            ProgressEvent::Completed { result, total_time } => match result {
                TaskResult::Succeeded => info!(
                    result = %result,
                    total_time_ms = total_time.as_millis(),
                    "Build step complete"
                ),
                TaskResult::Failed => warn!(
                    result = %result,
                    total_time_ms = total_time.as_millis(),
                    "Build step complete"
                ),
            },
        }
    }
}
