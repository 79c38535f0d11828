use anyhow::{Context, Result};
use confyg::{env, Confygery};
use hamms_core::WeightProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engine::{RankOptions, SimilarityEngine};

/// Configuration for a hamms scoring session.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. Explicit overrides from the embedding application (highest priority)
/// 2. Environment variables (HAMMS_* prefix)
/// 3. Config file (~/.config/hamms/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-dimension weights.
    ///
    /// Can be set via:
    /// - ENV: HAMMS_WEIGHTS_<DIMENSION>, e.g. HAMMS_WEIGHTS_KEY=2.5
    /// - Config: a `[weights]` table keyed by dimension name
    /// - Override: `Config::load_with_weights_file`
    /// - Default: the built-in profile (key 1.4, tempo 1.3, ...)
    pub weights: WeightProfile,

    /// Cut-offs applied when ranking candidates.
    ///
    /// Can be set via:
    /// - ENV: HAMMS_RANKING_TOP_K, HAMMS_RANKING_MIN_SCORE
    /// - Config: a `[ranking]` table with `top_k` and `min_score`
    /// - Default: no cut-offs
    pub ranking: RankOptions,
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/hamms/config.toml
    /// Reads environment variables with HAMMS_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let mut env_opts = env::Options::with_top_level("hamms");
        env_opts.add_section("weights").add_section("ranking");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?;

        log::debug!("Loaded configuration (file: {})", config_path.display());
        Ok(config)
    }

    /// Load configuration, then replace the weights with a standalone
    /// weight profile file.
    pub fn load_with_weights_file(weights_path: &Path) -> Result<Self> {
        let mut config = Self::load()?;
        config.weights = WeightProfile::load(weights_path).with_context(|| {
            format!("Failed to load weight profile {}", weights_path.display())
        })?;
        Ok(config)
    }

    /// Parse configuration from TOML text, without consulting the
    /// environment.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Create a scoring engine from the configured weights.
    pub fn engine(&self) -> Result<SimilarityEngine> {
        SimilarityEngine::new(self.weights.clone()).context("Invalid weight profile")
    }
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/hamms/config.toml
/// - macOS: ~/Library/Application Support/hamms/config.toml
/// - Windows: %APPDATA%\hamms\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hamms")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# HAMMS Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. Explicit overrides from the embedding application (highest priority)
# 2. Environment variables (HAMMS_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Per-dimension weights used by the compatibility score.
#
# Weights must be positive. Only their ratios matter: the distance is
# divided by the total weight. Dimensions left out keep their default.
#
# Can also be set via:
# - Environment: HAMMS_WEIGHTS_KEY=1.6
[weights]
tempo = 1.3
key = 1.4
energy = 1.2
danceability = 1.0
valence = 0.9
acousticness = 0.6
instrumentalness = 0.7
rhythmic_pattern = 1.0
spectral_centroid = 0.8
tempo_stability = 0.8
harmonic_complexity = 0.9
dynamic_range = 0.7

# Cut-offs applied when ranking candidates against a query track.
#
# Can also be set via:
# - Environment: HAMMS_RANKING_TOP_K=25
# - Environment: HAMMS_RANKING_MIN_SCORE=0.6
[ranking]
#top_k = 25
#min_score = 0.6
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    write_example_config(&config_file_path())
}

fn write_example_config(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;
    log::info!("Created config file {}", config_path.display());

    Ok(true)
}
