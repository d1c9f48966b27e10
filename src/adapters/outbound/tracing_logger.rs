use crate::domains::logger::AnalysisLogger;
use std::sync::Arc;

/// Forwards analysis messages to `tracing` under the `crowding` target.
pub struct TracingLogger;

impl AnalysisLogger for TracingLogger {
    fn info(&self, msg: &str) {
        tracing::info!(target: "crowding", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "crowding", "{}", msg);
    }

    fn debug(&self, msg: &str) {
        tracing::debug!(target: "crowding", "{}", msg);
    }
}

pub fn init_tracing_logger() -> Arc<dyn AnalysisLogger> {
    Arc::new(TracingLogger)
}
