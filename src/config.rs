//! YAML configuration for samemail runs.
//!
//! Every stage config lives in its own crate; this module only gathers them
//! under one versioned document so a run can be reproduced from a file.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "inbox scan"
//! log_level: "info"
//!
//! perceptual:
//!   num_hashes: 25
//!   seed: 1732584193
//!   use_parallel: false
//!   shingle:
//!     width: 3
//!     tail_policy: drop
//!     dedup: false
//!
//! rating:
//!   threshold: 0.4
//!   comparison: exclusive
//!   same_sender_coeff: 2.0
//!   bonus: 0.1
//! ```
//!
//! Omitted sections and fields fall back to the stage defaults.

use std::fs;
use std::path::Path;

use perceptual::PerceptualConfig;
use rating::RatingConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for one samemail run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SamemailConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Log filter used by the binary when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub perceptual: PerceptualConfig,

    #[serde(default)]
    pub rating: RatingConfig,
}

impl SamemailConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SamemailConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_perceptual(mut self, perceptual: PerceptualConfig) -> Self {
        self.perceptual = perceptual;
        self
    }

    pub fn with_rating(mut self, rating: RatingConfig) -> Self {
        self.rating = rating;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.perceptual
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("perceptual: {err}")))?;
        self.rating
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("rating: {err}")))?;

        Ok(())
    }
}

impl Default for SamemailConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            log_level: default_log_level(),
            perceptual: PerceptualConfig::default(),
            rating: RatingConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use perceptual::TailPolicy;
    use rating::ThresholdComparison;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
perceptual:
  num_hashes: 64
  seed: 42
rating:
  threshold: 0.45
"#;

        let config = SamemailConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.perceptual.num_hashes, 64);
        assert_eq!(config.perceptual.seed, Some(42));
        assert_eq!(config.perceptual.shingle.width, 3);
        assert_eq!(config.rating.threshold, 0.45);
        assert_eq!(config.rating.same_sender_coeff, 2.0);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = "version: \"1\"\nlog_level: debug\n";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = SamemailConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_file() {
        let err = SamemailConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileRead(_)));
    }

    #[test]
    fn test_default_config() {
        let config = SamemailConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.name.is_none());
        assert_eq!(config.perceptual.num_hashes, 25);
        assert_eq!(config.rating.threshold, 0.4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_version() {
        let result = SamemailConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(
            result,
            Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }

    #[test]
    fn test_perceptual_validation() {
        let yaml = r#"
version: "1.0"
perceptual:
  num_hashes: 0
"#;

        let result = SamemailConfig::from_yaml(yaml);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("perceptual"), "{err}");
        assert!(err.contains("hash count"), "{err}");
    }

    #[test]
    fn test_rating_validation() {
        let yaml = r#"
version: "1.0"
rating:
  threshold: 1.5
"#;

        let err = SamemailConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(ref m) if m.starts_with("rating")));
    }

    #[test]
    fn test_enum_fields() {
        let yaml = r#"
version: "1.0"
perceptual:
  shingle:
    tail_policy: keep
    dedup: true
rating:
  comparison: inclusive
"#;

        let config = SamemailConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.perceptual.shingle.tail_policy, TailPolicy::Keep);
        assert!(config.perceptual.shingle.dedup);
        assert_eq!(config.rating.comparison, ThresholdComparison::Inclusive);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = SamemailConfig::default().with_rating(RatingConfig::default().with_bonus(0.2));
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert_eq!(SamemailConfig::from_yaml(&yaml).unwrap(), config);
    }
}
