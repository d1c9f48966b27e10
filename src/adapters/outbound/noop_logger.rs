use crate::domains::logger::AnalysisLogger;
use std::sync::Arc;

struct NoOp;

impl AnalysisLogger for NoOp {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn debug(&self, _msg: &str) {}
}

/// Discards everything; the default for tests.
pub fn init_noop_logger() -> Arc<dyn AnalysisLogger> {
    Arc::new(NoOp)
}
