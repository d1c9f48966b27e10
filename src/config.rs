use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domains::crowding::AnalysisParams;

/// Prefix of environment overrides, e.g. `CROWDING__ANALYSIS__SEED=7`.
pub const ENV_PREFIX: &str = "CROWDING";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Spacing below which a grid cell counts as crowded.
    pub desired_spacing: f64,
    pub grid_size: f64,
    pub iterations: u32,
    pub attractor_radius: f64,
    pub attraction_strength: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub parallel: bool,
    pub workers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let params = AnalysisParams::default();
        Self {
            desired_spacing: params.desired_spacing,
            grid_size: params.grid_pitch,
            iterations: params.iterations,
            attractor_radius: params.attractor_radius,
            attraction_strength: params.attractor_strength,
            seed: params.seed,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            workers: 4,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl AnalysisConfig {
    pub fn to_params(&self) -> AnalysisParams {
        AnalysisParams {
            desired_spacing: self.desired_spacing,
            grid_pitch: self.grid_size,
            iterations: self.iterations,
            attractor_radius: self.attractor_radius,
            attractor_strength: self.attraction_strength,
            seed: self.seed,
        }
    }
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults, then the optional file, then `CROWDING__SECTION__KEY` environment variables.
    pub fn load_layered(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(p) = path {
            builder = builder.add_source(config::File::from(p).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );
        let layered = builder.build().context("building layered config")?;
        let config: Config = layered
            .try_deserialize()
            .context("deserializing layered config")?;
        Ok(config)
    }
}
