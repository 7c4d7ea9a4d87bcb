//! Configuration system

pub use serde::{Deserialize, Serialize};

use crate::spatial::QuadTreeConfig;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Pick the format from the extension
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tuning for the collision pipeline.
///
/// Every field has a sensible default, so partial config files work;
/// omitted fields fall back to the values in [`CollisionConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Route group queries through the spatial index instead of testing
    /// the caller against every group member
    pub use_spatial_index: bool,

    /// Quadtree behavior for indexed group queries
    pub index: QuadTreeConfig,

    /// Smallest fraction of a step one sub-step may cover; keeps thin
    /// and point shapes from demanding unbounded sub-step counts
    pub substep_floor: f64,

    /// Upper bound on sub-steps spent on any single pair
    pub max_substeps: u32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            use_spatial_index: true,
            index: QuadTreeConfig::default(),
            substep_floor: 1.0 / 64.0,
            max_substeps: 64,
        }
    }
}

impl Config for CollisionConfig {}
