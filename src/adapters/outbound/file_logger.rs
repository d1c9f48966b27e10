use crate::domains::logger::{AnalysisLogger, FileLogger};
use std::sync::Arc;

/// Installs the fast_log file backend and returns a logger writing to it.
pub fn init_file_logger(path: &str, level: &str) -> Result<Arc<dyn AnalysisLogger>, String> {
    FileLogger::init(path, level).map_err(|e| format!("Failed to initialize fast_log at {}: {}", path, e))?;
    Ok(Arc::new(FileLogger))
}
