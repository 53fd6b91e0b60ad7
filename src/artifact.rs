//! The persisted range model.
//!
//! One bincode-encoded [`ModelArtifact`] per file. Besides the fitted
//! parameters it records the feature list it was trained on, so a model
//! trained against a different column layout is refused at load time.

use crate::backend::{Backend, CpuBackend};
use crate::error::{ModelLoadError, TrainError};
use crate::preprocessing::{PredictivePipeline, PredictivePipelineParams};
use crate::schema::{FEATURES, N_FEATURES, TARGET};
use crate::serialization::SerializableParams;
use crate::training::TrainingReport;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Bumped whenever the encoded layout changes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub features: Vec<String>,
    pub target: String,
    pub pipeline: PredictivePipelineParams,
    pub report: TrainingReport,
}

impl ModelArtifact {
    pub fn new<B: Backend>(pipeline: &PredictivePipeline<B>, report: TrainingReport) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
            target: TARGET.to_string(),
            pipeline: pipeline.extract_params(),
            report,
        }
    }

    /// Writes the artifact, creating missing parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TrainError> {
        let path = path.as_ref();
        let save_err = |source| TrainError::Save {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(save_err)?;
        }
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes).map_err(save_err)?;
        info!("saved model artifact to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ModelLoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ModelLoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let artifact = Self::from_bytes(&bytes).map_err(|e| ModelLoadError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Checks version, schema and target against this build.
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ModelLoadError::Invalid(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                self.format_version
            )));
        }
        if self.features.iter().map(String::as_str).ne(FEATURES) {
            return Err(ModelLoadError::SchemaMismatch {
                expected: FEATURES.iter().map(|f| f.to_string()).collect(),
                found: self.features.clone(),
            });
        }
        if self.target != TARGET {
            return Err(ModelLoadError::Invalid(format!(
                "artifact predicts `{}`, expected `{TARGET}`",
                self.target
            )));
        }
        Ok(())
    }

    /// Rebuilds the fitted pipeline on backend `B`.
    pub fn pipeline<B: Backend>(&self) -> Result<PredictivePipeline<B>, ModelLoadError> {
        if let Some(poly) = &self.pipeline.poly {
            if !matches!(poly.degree, 1 | 2) || poly.n_features_in != N_FEATURES {
                return Err(ModelLoadError::Invalid(format!(
                    "polynomial expansion of degree {} over {} inputs",
                    poly.degree, poly.n_features_in
                )));
            }
        }
        let pipeline = PredictivePipeline::<B>::from_params(self.pipeline.clone())
            .map_err(|e| ModelLoadError::Invalid(e.to_string()))?;
        if pipeline.n_features_in() != N_FEATURES {
            return Err(ModelLoadError::Invalid(format!(
                "pipeline takes {} inputs, schema has {N_FEATURES}",
                pipeline.n_features_in()
            )));
        }
        Ok(pipeline)
    }

    /// Linear coefficients on standardised inputs, named after the columns
    /// they multiply, largest magnitude first.
    pub fn coefficients(&self) -> Result<Vec<(String, f64)>, ModelLoadError> {
        let pipeline = self.pipeline::<CpuBackend>()?;
        let names: Vec<String> = match pipeline.poly() {
            Some(poly) => poly.feature_names(&FEATURES),
            None => FEATURES.iter().map(|f| f.to_string()).collect(),
        };
        let mut coefs: Vec<(String, f64)> =
            names.into_iter().zip(pipeline.model().weights()).collect();
        coefs.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        Ok(coefs)
    }
}
