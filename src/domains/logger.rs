use chrono::Utc;
use log::{debug as log_debug, info as log_info, warn as log_warn};
use std::str::FromStr;
use std::sync::Arc;

/// Logging port for the crowding analysis.
/// Non-fallible from the caller's perspective; adapters decide where messages go.
pub trait AnalysisLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn debug(&self, msg: &str);
}

pub type DynLogger = Arc<dyn AnalysisLogger>;

/// File adapter on top of `fast_log`; messages go through the `log` facade.
pub struct FileLogger;

impl FileLogger {
    /// Installs `fast_log` as the global `log` backend writing to `path`.
    /// Fails if another `log` backend is already installed.
    pub fn init(path: &str, level: &str) -> Result<(), Box<dyn std::error::Error>> {
        let level = log::LevelFilter::from_str(level).unwrap_or(log::LevelFilter::Info);
        fast_log::init(fast_log::config::Config::new().file(path).level(level))?;
        Ok(())
    }
}

impl AnalysisLogger for FileLogger {
    fn info(&self, msg: &str) {
        log_info!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn debug(&self, msg: &str) {
        log_debug!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
}
