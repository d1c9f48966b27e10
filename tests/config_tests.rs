use std::fs;
use std::sync::{Arc, Mutex};

use sidewalk_crowding::adapters::outbound::{init_logger, FanoutLogger};
use sidewalk_crowding::config::{LoggingConfig, ENV_PREFIX};
use sidewalk_crowding::domains::crowding::AnalysisParams;
use sidewalk_crowding::domains::logger::{AnalysisLogger, DynLogger};
use sidewalk_crowding::Config;
use tempfile::tempdir;

const CONFIG_TOML: &str = r#"
[analysis]
desired_spacing = 4.5
grid_size = 2.0
iterations = 8

[runtime]
parallel = false

[logging]
level = "debug"
"#;

#[test]
fn test_defaults_match_analysis_params() {
    let config = Config::default();
    assert_eq!(config.analysis.to_params(), AnalysisParams::default());
    assert!(config.runtime.parallel);
    assert_eq!(config.runtime.workers, 4);
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.file.is_none());
}

#[tokio::test]
async fn test_from_file_fills_missing_keys_with_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crowding.toml");
    fs::write(&path, CONFIG_TOML).unwrap();

    let config = Config::from_file(&path).await.unwrap();
    assert_eq!(config.analysis.desired_spacing, 4.5);
    assert_eq!(config.analysis.grid_size, 2.0);
    assert_eq!(config.analysis.iterations, 8);
    assert_eq!(config.analysis.seed, 42);
    assert!(!config.runtime.parallel);
    assert_eq!(config.runtime.workers, 4);
    assert_eq!(config.logging.level, "debug");
}

#[tokio::test]
async fn test_from_file_missing_path_is_error() {
    let dir = tempdir().unwrap();
    assert!(Config::from_file(dir.path().join("absent.toml")).await.is_err());
}

#[test]
fn test_layered_env_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crowding.toml");
    fs::write(&path, CONFIG_TOML).unwrap();

    let var = format!("{}__ANALYSIS__SEED", ENV_PREFIX);
    std::env::set_var(&var, "7");
    let config = Config::load_layered(Some(path.as_path()));
    std::env::remove_var(&var);
    let config = config.unwrap();

    assert_eq!(config.analysis.seed, 7);
    assert_eq!(config.analysis.iterations, 8);
    assert_eq!(config.analysis.attractor_radius, 30.0);
    assert_eq!(config.logging.level, "debug");

    // a missing file is not fatal
    let absent = dir.path().join("absent.toml");
    let fallback = Config::load_layered(Some(absent.as_path())).unwrap();
    assert_eq!(fallback.analysis.iterations, 5);
}

struct CaptureLogger {
    tag: &'static str,
    messages: Arc<Mutex<Vec<String>>>,
}

impl AnalysisLogger for CaptureLogger {
    fn info(&self, msg: &str) { self.messages.lock().unwrap().push(format!("{}:INFO:{}", self.tag, msg)); }
    fn warn(&self, msg: &str) { self.messages.lock().unwrap().push(format!("{}:WARN:{}", self.tag, msg)); }
    fn debug(&self, msg: &str) { self.messages.lock().unwrap().push(format!("{}:DEBUG:{}", self.tag, msg)); }
}

#[test]
fn test_fanout_forwards_to_every_sink_in_order() {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sinks: Vec<DynLogger> = vec![
        Arc::new(CaptureLogger { tag: "a", messages: messages.clone() }),
        Arc::new(CaptureLogger { tag: "b", messages: messages.clone() }),
    ];
    let fanout = FanoutLogger::new(sinks);
    assert_eq!(fanout.len(), 2);

    fanout.warn("segment skipped");
    fanout.debug("pass");

    let got = messages.lock().unwrap().clone();
    assert_eq!(
        got,
        vec![
            "a:WARN:segment skipped".to_string(),
            "b:WARN:segment skipped".to_string(),
            "a:DEBUG:pass".to_string(),
            "b:DEBUG:pass".to_string(),
        ]
    );
}

#[test]
fn test_init_logger_without_file_is_usable() {
    let logger = init_logger(&LoggingConfig::default());
    logger.info("ready");
    assert!(FanoutLogger::new(Vec::new()).is_empty());
}
