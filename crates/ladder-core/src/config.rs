use crate::errors::ConfigError;
use crate::model::ArtifactPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_MARKER_TAG: &str = "FINAL_ANSWER";
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Inclusive complexity-level range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    pub min: u32,
    pub max: u32,
}

impl LevelRange {
    pub fn iter(&self) -> std::ops::RangeInclusive<u32> {
        self.min..=self.max
    }

    pub fn count(&self) -> usize {
        (self.max - self.min) as usize + 1
    }
}

/// Structural knobs held constant across levels so that operation count is
/// the only varied parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    #[serde(default = "default_operand_min")]
    pub operand_min: i64,
    #[serde(default = "default_operand_max")]
    pub operand_max: i64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            operand_min: default_operand_min(),
            operand_max: default_operand_max(),
        }
    }
}

fn default_operand_min() -> i64 {
    1
}
fn default_operand_max() -> i64 {
    10
}
fn default_marker_tag() -> String {
    DEFAULT_MARKER_TAG.to_string()
}
fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    pub version: u32,
    pub suite: String,
    pub model: String,
    pub levels: LevelRange,
    pub problems_per_level: u32,
    #[serde(default = "default_marker_tag")]
    pub marker_tag: String,
    /// Absolute tolerance for non-integral ground truths; integral ground
    /// truths require exact matches.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub parallel: Option<usize>,
    #[serde(default)]
    pub artifact_policy: ArtifactPolicy,
    #[serde(default)]
    pub generator: GeneratorSettings,
    /// When set, the historical CDS baseline is computed against this
    /// reference maximum level and reported next to R-CDS.
    #[serde(default)]
    pub legacy_reference_level: Option<u32>,
}

impl EvalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.max < self.levels.min {
            return Err(ConfigError(format!(
                "level range {}..={} is empty",
                self.levels.min, self.levels.max
            )));
        }
        if self.problems_per_level == 0 {
            return Err(ConfigError("problems_per_level must be at least 1".into()));
        }
        if self.marker_tag.trim().is_empty() {
            return Err(ConfigError("marker_tag must not be empty".into()));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.generator.operand_min > self.generator.operand_max {
            return Err(ConfigError(format!(
                "operand range {}..={} is empty",
                self.generator.operand_min, self.generator.operand_max
            )));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<EvalConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    let cfg: EvalConfig = serde_yaml::from_str(&raw)
        .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    cfg.validate()?;
    Ok(cfg)
}
