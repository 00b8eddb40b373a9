//! Configuration for the label scorer.
//!
//! `ScorerConfig` holds the knobs the core needs. `Settings` wraps it with
//! the seed labels and file locations used by the command-line wrapper, loaded
//! in layers: defaults -> config file -> env vars -> CLI flags.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScorerError};

/// Core scoring configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Embedding model identifier, passed through to the embedder
    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound on descriptions per label, seed included
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,

    /// Number of best-matching descriptions averaged per label
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_max_description_length() -> usize {
    20
}

fn default_k() -> usize {
    3
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_description_length: default_max_description_length(),
            k: default_k(),
        }
    }
}

impl ScorerConfig {
    /// Validate configuration values.
    ///
    /// `k` larger than a label's description count is fine; it is clamped
    /// per label at scoring time.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ScorerError::InvalidConfig(
                "model must not be empty".to_string(),
            ));
        }
        if self.k == 0 {
            return Err(ScorerError::InvalidConfig("k must be > 0".to_string()));
        }
        // The seed takes one slot
        if self.max_description_length < 2 {
            return Err(ScorerError::InvalidConfig(format!(
                "max_description_length must be >= 2, got {}",
                self.max_description_length
            )));
        }
        Ok(())
    }
}

/// A label and the example phrases it starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSeed {
    pub name: String,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

/// Settings for the command-line wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Scoring configuration
    #[serde(default)]
    pub scorer: ScorerConfig,

    /// Labels to seed the scorer with
    #[serde(default)]
    pub labels: Vec<LabelSeed>,

    /// Where learned descriptions and vectors are kept between runs
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Model download directory (platform cache dir when unset)
    #[serde(default)]
    pub model_cache_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_snapshot_path() -> String {
    ProjectDirs::from("", "", "label-scorer")
        .map(|p| p.data_local_dir().join("snapshot.json"))
        .unwrap_or_else(|| PathBuf::from("./snapshot.json"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scorer: ScorerConfig::default(),
            labels: Vec::new(),
            snapshot_path: default_snapshot_path(),
            model_cache_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/label-scorer/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (SCORER_*, `__` for nesting)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self> {
        let config_dir = ProjectDirs::from("", "", "label-scorer")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("scorer.model", default_model())
            .map_err(|e| ScorerError::Config(e.to_string()))?
            .set_default(
                "scorer.max_description_length",
                default_max_description_length() as i64,
            )
            .map_err(|e| ScorerError::Config(e.to_string()))?
            .set_default("scorer.k", default_k() as i64)
            .map_err(|e| ScorerError::Config(e.to_string()))?
            .set_default("snapshot_path", default_snapshot_path())
            .map_err(|e| ScorerError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| ScorerError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::from(Path::new(path)).required(true));
        }

        // SCORER_LOG_LEVEL, SCORER_SCORER__K, ...
        builder = builder.add_source(
            Environment::with_prefix("SCORER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ScorerError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| ScorerError::Config(e.to_string()))?;
        settings.scorer.validate()?;
        Ok(settings)
    }

    /// Seed labels as a label -> descriptions mapping.
    ///
    /// A label listed twice has its descriptions concatenated.
    pub fn label_map(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for seed in &self.labels {
            map.entry(seed.name.clone())
                .or_default()
                .extend(seed.descriptions.iter().cloned());
        }
        map
    }

    /// Expand ~ in snapshot_path to the home directory
    pub fn expanded_snapshot_path(&self) -> PathBuf {
        expand_home(&self.snapshot_path)
    }

    pub fn expanded_model_cache_dir(&self) -> Option<PathBuf> {
        self.model_cache_dir.as_deref().map(expand_home)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
