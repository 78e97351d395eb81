//! Configuration management and loading for heapviz.
//!
//! Configuration is the boundary where a bad branching factor or random
//! range is caught; everything past [`VisualizerConfig::validate`] may assume
//! well-formed values.

use anyhow::Context;
use heapviz_core::{BranchingFactor, HeapOrder};
use heapviz_logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration format types supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    #[default]
    Yaml,
}

impl ConfigFormat {
    /// Detect format from a file extension, defaulting to YAML.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Main heapviz configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizerConfig {
    /// Maximum children per node
    #[serde(default = "default_branching_factor")]
    pub branching_factor: usize,

    /// Min-heap or max-heap
    #[serde(default)]
    pub order: HeapOrder,

    /// Pause between animation steps, in milliseconds
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    /// Entries kept in the operation log
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    /// Random heap generation
    #[serde(default)]
    pub random: RandomConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_branching_factor() -> usize {
    BranchingFactor::BINARY.get()
}

fn default_step_delay_ms() -> u64 {
    800
}

fn default_log_capacity() -> usize {
    10
}

/// Settings for the "random heap" operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomConfig {
    #[serde(default = "default_min_len")]
    pub min_len: usize,
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    /// Values are drawn from `0..=max_value`
    #[serde(default = "default_max_value")]
    pub max_value: i64,
    /// Fixed seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_min_len() -> usize {
    5
}

fn default_max_len() -> usize {
    14
}

fn default_max_value() -> i64 {
    99
}

impl RandomConfig {
    /// Largest array the random operation may generate.
    pub const MAX_LEN: usize = 1_000;
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            min_len: default_min_len(),
            max_len: default_max_len(),
            max_value: default_max_value(),
            seed: None,
        }
    }
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            branching_factor: default_branching_factor(),
            order: HeapOrder::default(),
            step_delay_ms: default_step_delay_ms(),
            log_capacity: default_log_capacity(),
            random: RandomConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    BranchingFactor(usize),
    RandomRange { min_len: usize, max_len: usize },
    RandomTooLarge { max_len: usize, limit: usize },
    NegativeMaxValue(i64),
    ZeroLogCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BranchingFactor(d) => {
                write!(f, "branching_factor must be at least 2, got {d}")
            }
            ConfigError::RandomRange { min_len, max_len } => {
                write!(f, "random.min_len ({min_len}) exceeds random.max_len ({max_len})")
            }
            ConfigError::RandomTooLarge { max_len, limit } => {
                write!(f, "random.max_len ({max_len}) exceeds the limit of {limit}")
            }
            ConfigError::NegativeMaxValue(v) => {
                write!(f, "random.max_value must not be negative, got {v}")
            }
            ConfigError::ZeroLogCapacity => write!(f, "log_capacity must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl VisualizerConfig {
    /// Check every field; returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.branching_factor()?;
        if self.random.min_len > self.random.max_len {
            return Err(ConfigError::RandomRange {
                min_len: self.random.min_len,
                max_len: self.random.max_len,
            });
        }
        if self.random.max_len > RandomConfig::MAX_LEN {
            return Err(ConfigError::RandomTooLarge {
                max_len: self.random.max_len,
                limit: RandomConfig::MAX_LEN,
            });
        }
        if self.random.max_value < 0 {
            return Err(ConfigError::NegativeMaxValue(self.random.max_value));
        }
        if self.log_capacity == 0 {
            return Err(ConfigError::ZeroLogCapacity);
        }
        Ok(())
    }

    /// Validated branching factor
    pub fn branching_factor(&self) -> Result<BranchingFactor, ConfigError> {
        BranchingFactor::new(self.branching_factor)
            .map_err(|_| ConfigError::BranchingFactor(self.branching_factor))
    }
}

/// Load configuration from a file and validate it
pub fn load_config<P: Into<PathBuf>>(path: P) -> anyhow::Result<VisualizerConfig> {
    let path = path.into();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;

    let config: VisualizerConfig = match ConfigFormat::from_path(&path) {
        ConfigFormat::Json => serde_json::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON config: {}", e))?,
        ConfigFormat::Yaml => serde_yaml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse YAML config: {}", e))?,
    };

    config
        .validate()
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

/// Save configuration to a file
pub fn save_config<P: Into<PathBuf>>(config: &VisualizerConfig, path: P) -> anyhow::Result<()> {
    let path = path.into();
    let contents = match ConfigFormat::from_path(&path) {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON config: {}", e))?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)
            .map_err(|e| anyhow::anyhow!("Failed to serialize YAML config: {}", e))?,
    };

    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write config {}", path.display()))?;
    Ok(())
}
