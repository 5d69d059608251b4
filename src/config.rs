//! Application configuration.
//!
//! Configuration lives in a single JSON document with three sections. Every
//! field has a default, so a missing file, a missing section or a missing key
//! all fall back to the built-in values.
//!
//! ```json
//! {
//!   "engine": { "cluster_k": 4, "correlation_threshold": 0.6 },
//!   "logging": { "level": "debug" },
//!   "ai": { "enabled": false }
//! }
//! ```

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`LoggingSettings::level`].
pub const ENV_LOG_LEVEL: &str = "SIFTER_LOG_LEVEL";
/// Environment variable overriding [`EngineSettings::cluster_k`].
pub const ENV_CLUSTER_K: &str = "SIFTER_CLUSTER_K";

/// Tuning knobs for the analytics engine.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// A column whose distinct/non-missing ratio is below this is categorical.
    pub categorical_ratio: f64,
    /// Rows returned in filter and upload samples.
    pub sample_rows: usize,
    /// Correlations with an absolute value at or below this are not reported.
    pub correlation_threshold: f64,
    pub cluster_k: usize,
    pub cluster_seed: u64,
    pub kmeans_max_iter: usize,
    /// Clustering runs on at most this many complete rows.
    pub cluster_max_rows: usize,
    /// Number of numeric column triples projected in 3-D.
    pub max_triples: usize,
    /// Scatter projections keep at most this many points.
    pub scatter_row_cap: usize,
    /// Surface grids are `surface_resolution` x `surface_resolution`.
    pub surface_resolution: usize,
    /// Minimum complete points before a surface is emitted.
    pub surface_min_points: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            categorical_ratio: 0.5,
            sample_rows: 10,
            correlation_threshold: 0.5,
            cluster_k: 3,
            cluster_seed: 42,
            kmeans_max_iter: 300,
            cluster_max_rows: 5_000,
            max_triples: 3,
            scatter_row_cap: 1_000,
            surface_resolution: 15,
            surface_min_points: 10,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Overrides `<data_dir>/sifter/logs`.
    pub directory: Option<PathBuf>,
    /// When false only the stderr layer is installed.
    pub file_logging: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            directory: None,
            file_logging: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AIConfig {
    pub enabled: bool,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4o".to_owned(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineSettings,
    pub logging: LoggingSettings,
    pub ai: AIConfig,
}

impl AppConfig {
    /// Loads configuration from `path`, or from the default location when
    /// `path` is `None`, then applies environment overrides.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => match get_config_path() {
                Some(path) if path.exists() => Self::read(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Applies `SIFTER_*` environment overrides. Unparseable values are
    /// ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL)
            && !level.trim().is_empty()
        {
            self.logging.level = level.trim().to_owned();
        }

        if let Ok(raw) = std::env::var(ENV_CLUSTER_K) {
            match raw.trim().parse::<usize>() {
                Ok(k) => self.engine.cluster_k = k,
                Err(_) => {
                    tracing::warn!("Ignoring {ENV_CLUSTER_K}={raw:?}: not a positive integer");
                }
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error for settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let engine = &self.engine;
        anyhow::ensure!(engine.cluster_k > 0, "engine.cluster_k must be at least 1");
        anyhow::ensure!(
            engine.surface_resolution > 0,
            "engine.surface_resolution must be at least 1"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&engine.categorical_ratio),
            "engine.categorical_ratio must be within [0, 1]"
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&engine.correlation_threshold),
            "engine.correlation_threshold must be within [0, 1)"
        );
        Ok(())
    }
}

/// `<config_dir>/sifter/config.json`, if the platform has a config directory.
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sifter").join("config.json"))
}

/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_app_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"engine": {"cluster_k": 5}}"#).unwrap();
        assert_eq!(config.engine.cluster_k, 5);
        assert_eq!(config.engine.sample_rows, 10);
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.engine.max_triples = 1;
        config.ai.enabled = false;
        save_app_config(&config, &path).unwrap();

        let loaded = AppConfig::read(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("absent.json")));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_clusters() {
        let mut config = AppConfig::default();
        config.engine.cluster_k = 0;
        assert!(config.validate().is_err());
    }
}
