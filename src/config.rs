//! Configuration loaded from `tutor.toml`
//!
//! ```toml
//! data_dir = "/home/me/.local/share/tutor"
//! rng_seed = 42
//!
//! [gateway]
//! timeout_secs = 30
//! max_retries = 1
//! retry_delay_ms = 500
//!
//! [review]
//! limit = 20
//! window = "due"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scheduler::{ReviewFilters, ReviewWindow};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    pub data_dir: PathBuf,
    pub gateway: GatewayConfig,
    pub review: ReviewConfig,
    /// Fixed seed for review component selection; entropy when absent
    pub rng_seed: Option<u64>,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            gateway: GatewayConfig::default(),
            review: ReviewConfig::default(),
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 1,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub limit: usize,
    pub window: ReviewWindow,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            limit: 20,
            window: ReviewWindow::Due,
        }
    }
}

impl ReviewConfig {
    pub fn filters(&self) -> ReviewFilters {
        ReviewFilters {
            window: self.window,
            limit: Some(self.limit),
            ..Default::default()
        }
    }
}

/// Platform data directory, e.g. ~/.local/share/tutor
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tutor")
}

impl TutorConfig {
    /// Load configuration, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = TutorConfig::from_toml_str(
            r#"
            rng_seed = 7

            [gateway]
            timeout_secs = 5

            [review]
            window = "week"
            "#,
        )
        .unwrap();

        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.gateway.timeout_secs, 5);
        assert_eq!(config.gateway.max_retries, 1);
        assert_eq!(config.review.window, ReviewWindow::Week);
        assert_eq!(config.review.limit, 20);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = TutorConfig::load(&dir.path().join("tutor.toml")).unwrap();
        assert_eq!(config, TutorConfig::default());
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        let result = TutorConfig::from_toml_str("[review]\nwindow = \"fortnight\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }
}
