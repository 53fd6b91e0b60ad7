//! Training configuration.
//!
//! Every field has a default, so a JSON file only needs the keys it wants to
//! change. CLI flags are applied on top of the loaded value.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the model artifact for serving commands.
pub const MODEL_PATH_ENV: &str = "EV_RANGE_MODEL";

pub const DEFAULT_MODEL_PATH: &str = "models/ev_range_model.bin";
pub const DEFAULT_DATA_PATH: &str = "data/electric_vehicles_spec_2025.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    /// Held-out share of the rows, in (0, 1).
    pub test_fraction: f64,
    pub seed: u64,
    /// Run the randomized search before the final fit.
    pub tune: bool,
    pub hyperparams: Hyperparams,
    pub search: SearchSpace,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            test_fraction: 0.2,
            seed: 42,
            tune: false,
            hyperparams: Hyperparams::default(),
            search: SearchSpace::default(),
        }
    }
}

/// Knobs of a single fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparams {
    pub learning_rate: f64,
    pub epochs: usize,
    pub batch_size: usize,
    /// Ridge strength; 0 disables the penalty.
    pub l2: f64,
    /// 1 = plain linear, 2 = squares and interactions.
    pub poly_degree: usize,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Self {
            learning_rate: 0.02,
            epochs: 500,
            batch_size: 32,
            l2: 0.0,
            poly_degree: 2,
        }
    }
}

impl Hyperparams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.epochs == 0 {
            return Err(ConfigError::Invalid("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "l2 must be non-negative, got {}",
                self.l2
            )));
        }
        if !matches!(self.poly_degree, 1 | 2) {
            return Err(ConfigError::Invalid(format!(
                "poly_degree must be 1 or 2, got {}",
                self.poly_degree
            )));
        }
        Ok(())
    }
}

/// Candidate values sampled by the randomized search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSpace {
    pub learning_rates: Vec<f64>,
    pub epochs: Vec<usize>,
    pub batch_sizes: Vec<usize>,
    pub l2: Vec<f64>,
    pub poly_degrees: Vec<usize>,
    /// Number of sampled candidates.
    pub n_iter: usize,
    /// Cross-validation folds per candidate.
    pub cv: usize,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            learning_rates: vec![0.01, 0.03, 0.05, 0.1],
            epochs: vec![200, 400, 800],
            batch_sizes: vec![16, 32, 64],
            l2: vec![0.0, 0.001, 0.01, 0.1],
            poly_degrees: vec![1, 2],
            n_iter: 10,
            cv: 3,
        }
    }
}

impl SearchSpace {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let empty = [
            ("learning_rates", self.learning_rates.is_empty()),
            ("epochs", self.epochs.is_empty()),
            ("batch_sizes", self.batch_sizes.is_empty()),
            ("l2", self.l2.is_empty()),
            ("poly_degrees", self.poly_degrees.is_empty()),
        ];
        if let Some((name, _)) = empty.iter().find(|(_, e)| *e) {
            return Err(ConfigError::Invalid(format!("search.{name} is empty")));
        }
        if self.n_iter == 0 {
            return Err(ConfigError::Invalid("search.n_iter must be at least 1".into()));
        }
        if self.cv < 2 {
            return Err(ConfigError::Invalid(format!(
                "search.cv must be at least 2, got {}",
                self.cv
            )));
        }
        Ok(())
    }
}

impl TrainConfig {
    /// Reads a JSON file; absent keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: TrainConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        self.hyperparams.validate()?;
        if self.tune {
            self.search.validate()?;
        }
        Ok(())
    }
}

/// Model path for serving commands: explicit value, then
/// [`MODEL_PATH_ENV`], then [`DEFAULT_MODEL_PATH`].
pub fn resolve_model_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(MODEL_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.test_fraction, 0.2);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.model_path, PathBuf::from("models/ev_range_model.bin"));
        assert!(cfg.validate().is_ok());
        assert!(cfg.search.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = TrainConfig::from_json_str(r#"{"seed": 7, "hyperparams": {"epochs": 50}}"#).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.hyperparams.epochs, 50);
        assert_eq!(cfg.hyperparams.learning_rate, 0.02);
        assert_eq!(cfg.search.n_iter, 10);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            TrainConfig::from_json_str(r#"{"test_fraction": 1.5}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(TrainConfig::from_json_str(r#"{"hyperparams": {"poly_degree": 3}}"#).is_err());
        assert!(TrainConfig::from_json_str(r#"{"hyperparams": {"batch_size": 0}}"#).is_err());
        assert!(TrainConfig::from_json_str(r#"{"tune": true, "search": {"cv": 1}}"#).is_err());
        assert!(matches!(
            TrainConfig::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_missing_file() {
        let err = TrainConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_explicit_model_path_wins() {
        assert_eq!(
            resolve_model_path(Some(PathBuf::from("a/b.bin"))),
            PathBuf::from("a/b.bin")
        );
    }
}
