//! Run configuration for textreuse
//!
//! Configuration lives in a TOML file (`textreuse.toml` by default). Every
//! field has a default, so an empty file is a valid configuration.

pub mod types;

use std::fs;
use std::path::Path;

use crate::bail_config;
use crate::error::{ReuseError, Result};
use crate::vectorize::Alphabet;

pub use types::{
    FeatureConfig, IndexConfig, IndexMode, QueryConfig, ReuseConfig, RuntimeConfig,
    ScoringConfig, DEFAULT_ALPHABET, NGRAM_WIDTH,
};

/// Default configuration file name
pub const CONFIG_FILE: &str = "textreuse.toml";

impl ReuseConfig {
    /// Load configuration from a file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| ReuseError::read_file(path, e))?;
        let config: ReuseConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration if the file exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ReuseError::failed("serialize config", e))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.features.ngram != NGRAM_WIDTH {
            bail_config!(
                "features.ngram must be {}, got {}",
                NGRAM_WIDTH,
                self.features.ngram
            );
        }

        Alphabet::new(&self.features.alphabet)?;

        if self.index.trees == 0 {
            bail_config!("index.trees must be >= 1");
        }

        if self.index.leaf_size < 2 {
            bail_config!("index.leaf_size must be >= 2");
        }

        if self.query.knn == 0 {
            bail_config!("query.knn must be >= 1");
        }

        if self.query.search_k == Some(0) {
            bail_config!("query.search_k must be >= 1 when set");
        }

        if !(0.0..=1.0).contains(&self.scoring.min_similarity) {
            bail_config!(
                "scoring.min_similarity must be in [0.0, 1.0], got {}",
                self.scoring.min_similarity
            );
        }

        Ok(())
    }
}
