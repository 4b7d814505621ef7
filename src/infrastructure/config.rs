use crate::application::anomaly_detector::{
    DEFAULT_CONTAMINATION, DEFAULT_MAX_SAMPLES, DEFAULT_N_ESTIMATORS, IsolationForest,
};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "config/diagnostics";
const ENV_PREFIX: &str = "DIAGNOSTICS";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub detector: DetectorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
    pub max_upload_bytes: usize,
}

/// Model settings applied to every batch. Nothing fitted is kept between runs.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub contamination: f64,
    pub n_estimators: usize,
    pub max_samples: usize,
    pub seed: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            contamination: DEFAULT_CONTAMINATION,
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_samples: DEFAULT_MAX_SAMPLES,
            seed: DEFAULT_SEED,
        }
    }
}

impl DetectorConfig {
    pub fn forest(&self) -> IsolationForest {
        IsolationForest::new()
            .with_contamination(self.contamination)
            .with_n_estimators(self.n_estimators)
            .with_max_samples(self.max_samples)
    }
}

/// Defaults, overlaid by `config/diagnostics.*` if present, overlaid by
/// `DIAGNOSTICS__SECTION__KEY` environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(File::with_name(CONFIG_FILE).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

    build_app_config(builder)
}

fn build_app_config(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<AppConfig> {
    let defaults = DetectorConfig::default();
    let settings = builder
        .set_default("server.bind_addr", DEFAULT_BIND_ADDR)?
        .set_default("server.max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as i64)?
        .set_default("detector.contamination", defaults.contamination)?
        .set_default("detector.n_estimators", defaults.n_estimators as i64)?
        .set_default("detector.max_samples", defaults.max_samples as i64)?
        .set_default("detector.seed", defaults.seed as i64)?
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.detector.forest().validate()?;
    Ok(app_config)
}
