//! YAML configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Allowed range for the similarity threshold
pub const MIN_SIMILARITY_RANGE: (f64, f64) = (0.0, 1.0);
/// Slider step for the similarity threshold
pub const MIN_SIMILARITY_STEP: f64 = 0.05;
/// Allowed range for accord edges per perfume
pub const TOP_ACCORDS_RANGE: (usize, usize) = (1, 5);

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Perfumes requested per dataset fetch
    pub max_perfumes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            max_perfumes: 300,
        }
    }
}

/// Initial render knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub min_similarity: f64,
    pub top_accords: usize,
    pub display_limit: usize,
    pub default_accords: Vec<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.65,
            top_accords: 3,
            display_limit: 10,
            default_accords: ["Floral", "Woody", "Citrus", "Fresh", "Spicy"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Activity session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mbti: String,
    /// SQLite file for the persisted session id; `session.db` in the data dir when unset
    pub storage_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mbti: "INFJ".to_string(),
            storage_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub graph: GraphConfig,
    pub session: SessionConfig,
}

/// `<data_dir>/scentmap`, falling back to `~/.local/share/scentmap`
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"))
        .join("scentmap")
}

/// Default config file location
pub fn default_config_path() -> PathBuf {
    data_dir().join("config.yaml")
}

/// Default session database location
pub fn default_session_db_path() -> PathBuf {
    data_dir().join("session.db")
}

impl Config {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Load from `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject knobs outside the ranges the UI offers
    pub fn validate(&self) -> ConfigResult<()> {
        let (lo, hi) = MIN_SIMILARITY_RANGE;
        let min = self.graph.min_similarity;
        if !(lo..=hi).contains(&min) {
            return Err(ConfigError::Invalid(format!(
                "graph.min_similarity must be in [{}, {}], got {}",
                lo, hi, min
            )));
        }
        let (lo, hi) = TOP_ACCORDS_RANGE;
        if !(lo..=hi).contains(&self.graph.top_accords) {
            return Err(ConfigError::Invalid(format!(
                "graph.top_accords must be in [{}, {}], got {}",
                lo, hi, self.graph.top_accords
            )));
        }
        if self.graph.display_limit == 0 {
            return Err(ConfigError::Invalid("graph.display_limit must be positive".into()));
        }
        if self.api.max_perfumes == 0 {
            return Err(ConfigError::Invalid("api.max_perfumes must be positive".into()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".into()));
        }
        Ok(())
    }

    /// Configured session database, or the default location
    pub fn session_db_path(&self) -> PathBuf {
        self.session
            .storage_path
            .clone()
            .unwrap_or_else(default_session_db_path)
    }
}

/// Snap a similarity threshold to the slider grid and range
pub fn snap_min_similarity(value: f64) -> f64 {
    let (lo, hi) = MIN_SIMILARITY_RANGE;
    let snapped = (value / MIN_SIMILARITY_STEP).round() * MIN_SIMILARITY_STEP;
    // two decimals: 13 * 0.05 is not exactly 0.65
    ((snapped * 100.0).round() / 100.0).clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.graph.min_similarity, 0.65);
        assert_eq!(config.graph.top_accords, 3);
        assert_eq!(config.api.max_perfumes, 300);
        assert_eq!(config.session.mbti, "INFJ");
        assert_eq!(config.graph.default_accords.len(), 5);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("graph:\n  display_limit: 25\n").unwrap();
        assert_eq!(config.graph.display_limit, 25);
        assert_eq!(config.graph.top_accords, 3);
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert!(matches!(
            Config::from_yaml("graph:\n  min_similarity: 1.5\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_yaml("graph:\n  top_accords: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(Config::from_yaml("graph: [1, 2"), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_load_round_trip_and_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());

        let mut config = Config::default();
        config.api.base_url = "https://scentmap.example".into();
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_snap_min_similarity() {
        assert_eq!(snap_min_similarity(0.66), 0.65);
        assert_eq!(snap_min_similarity(0.68), 0.7);
        assert_eq!(snap_min_similarity(-0.2), 0.0);
        assert_eq!(snap_min_similarity(3.0), 1.0);
    }
}
