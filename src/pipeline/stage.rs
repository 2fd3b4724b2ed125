use super::context::RunContext;
use super::report::Stage;
use anyhow::Result;
use async_trait::async_trait;

/// One step of a run.
///
/// Returning `Err` marks the stage failed; the orchestrator decides what that
/// means for the rest of the run.
#[async_trait]
pub trait RunStage: Send + Sync {
    fn stage(&self) -> Stage;

    /// Reason for not attempting the stage at all, if any
    fn skip_reason(&self, _context: &RunContext) -> Option<String> {
        None
    }

    async fn execute(&self, context: &mut RunContext) -> Result<()>;
}
