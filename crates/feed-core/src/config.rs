//! Configuration loading for the engine.
//!
//! All engine settings are loaded from a TOML configuration file. Every table
//! and key is optional and falls back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::influence::InfluenceWeights;
use crate::opinion::OpinionMethod;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Opinion update settings
    #[serde(default)]
    pub opinion: OpinionConfig,
    /// Neighbor influence weights
    #[serde(default)]
    pub influence: InfluenceWeights,
    /// Feed selection settings
    #[serde(default)]
    pub feed: FeedConfig,
    /// General engine settings
    #[serde(default)]
    pub engine: GeneralConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Opinion update configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpinionConfig {
    /// Model used when a request names none
    pub default_method: OpinionMethod,
    /// Geometric decay for the weighted mean model
    pub decay_factor: f64,
    /// Susceptibility used when a request names none
    pub default_susceptibility: f64,
    /// Decimal places kept when a score is persisted
    pub score_precision: u32,
    /// Anchor for the weighted Friedkin-Johnsen model when a user has no history
    pub neutral_anchor: f64,
}

impl Default for OpinionConfig {
    fn default() -> Self {
        Self {
            default_method: OpinionMethod::WeightedMean,
            decay_factor: 0.8,
            default_susceptibility: 0.0,
            score_precision: 3,
            neutral_anchor: 0.5,
        }
    }
}

/// Feed selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Feed size when a request names none
    pub default_limit: usize,
    /// Followee share when a request names none
    pub default_follower_ratio: f64,
    /// Distinct recent hashtags considered by search
    pub search_hashtag_limit: usize,
    /// Maximum posts returned by search
    pub search_result_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            default_follower_ratio: 1.0,
            search_hashtag_limit: 10,
            search_result_limit: 10,
        }
    }
}

/// General engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Seed for random feeds, search sampling and mention selection
    pub seed: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Feed simulation engine configuration

[opinion]
# weighted_mean | median | friedkin_johnsen | state_dependent_fj | weighted_friedkin_johnsen
default_method = "weighted_mean"
decay_factor = 0.8
default_susceptibility = 0.0
score_precision = 3
neutral_anchor = 0.5

[influence]
follow_weight = 1.0
like_weight = 0.2
dislike_weight = -0.2

[feed]
default_limit = 10
default_follower_ratio = 1.0
search_hashtag_limit = 10
search_result_limit = 10

[engine]
seed = 42
"#
    .to_string()
}
