use serde::Deserialize;
use skinage_capture::CaptureLimits;
use skinage_gauge::GaugeStyle;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// CLI configuration: optional TOML file, then `SKINAGE_*` environment
/// variables on top.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prediction service endpoint (POST).
    pub service_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after a connect/timeout failure or a 5xx reply.
    pub max_retries: u32,
    /// Where reports go when no explicit output path is given.
    pub output_dir: PathBuf,
    pub gauge: GaugeStyle,
    pub capture: CaptureLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:5000/upload_webcam".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            output_dir: PathBuf::from("."),
            gauge: GaugeStyle::default(),
            capture: CaptureLimits::default(),
        }
    }
}

impl Config {
    /// Defaults with `SKINAGE_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load from `path` (or `SKINAGE_CONFIG` when unset), then apply
    /// environment overrides. A missing file is only an error when named
    /// explicitly.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var("SKINAGE_CONFIG").ok().map(PathBuf::from);
        let Some(path) = path.map(Path::to_path_buf).or(env_path) else {
            return Ok(Self::from_env());
        };
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: shown.clone(),
            source,
        })?;
        tracing::debug!(path = %shown, "config file loaded");
        Ok(config)
    }

    /// Apply `SKINAGE_*` overrides from `lookup`. Unparseable numbers keep
    /// the current value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SKINAGE_SERVICE_URL") {
            self.service_url = url;
        }
        self.timeout_secs = parse_or(&lookup, "SKINAGE_TIMEOUT_SECS", self.timeout_secs);
        self.max_retries = parse_or(&lookup, "SKINAGE_MAX_RETRIES", self.max_retries);
        if let Some(dir) = lookup("SKINAGE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join("skin-report.svg")
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
