use crate::config::LoggingConfig;
use crate::domains::logger::{AnalysisLogger, DynLogger};
use std::sync::Arc;

use super::file_logger::init_file_logger;
use super::tracing_logger::init_tracing_logger;

/// Forwards every message to each of its sinks, in order.
pub struct FanoutLogger {
    sinks: Vec<DynLogger>,
}

impl FanoutLogger {
    pub fn new(sinks: Vec<DynLogger>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl AnalysisLogger for FanoutLogger {
    fn info(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.warn(msg));
    }

    fn debug(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.debug(msg));
    }
}

/// Tracing always; the fast_log file as well when `logging.file` is set and can be opened.
pub fn init_logger(config: &LoggingConfig) -> DynLogger {
    let tracing_sink = init_tracing_logger();
    let Some(path) = config.file.as_deref() else {
        return tracing_sink;
    };
    match init_file_logger(path, &config.level) {
        Ok(file_sink) => Arc::new(FanoutLogger::new(vec![tracing_sink, file_sink])),
        Err(e) => {
            tracing_sink.warn(&e);
            tracing_sink
        }
    }
}
