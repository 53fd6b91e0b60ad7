//! Serving-side inference over a loaded [`ModelArtifact`].
//!
//! A [`Predictor`] is immutable after construction and `Send + Sync`, so one
//! instance can be shared by any number of callers. The process-wide handle
//! behind [`init`] and [`global`] is loaded at most once.

use crate::artifact::ModelArtifact;
use crate::backend::{CpuBackend, Tensor2D};
use crate::error::{ModelLoadError, PredictError};
use crate::preprocessing::PredictivePipeline;
use crate::schema::{FeatureVector, N_FEATURES};
use crate::training::TrainingReport;
use log::{debug, info};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

pub struct Predictor {
    pipeline: PredictivePipeline<CpuBackend>,
    report: TrainingReport,
}

impl Predictor {
    /// Reads, validates and rebuilds the artifact at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let predictor = Self::from_artifact(ModelArtifact::load(path)?)?;
        info!(
            "loaded range model from {} (held-out MAE {:.2} km, R² {:.3})",
            path.display(),
            predictor.report.mae,
            predictor.report.r2
        );
        Ok(predictor)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelLoadError> {
        artifact.validate()?;
        let pipeline = artifact.pipeline::<CpuBackend>()?;
        Ok(Self {
            pipeline,
            report: artifact.report,
        })
    }

    /// Predicted range in km for a named, dynamically typed mapping.
    ///
    /// See [`FeatureVector::from_map`] for the validation rules.
    pub fn predict_range(&self, features: &HashMap<String, Value>) -> Result<f64, PredictError> {
        self.predict_vector(&FeatureVector::from_map(features)?)
    }

    pub fn predict_vector(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let row = Tensor2D::new(features.as_slice().to_vec(), 1, N_FEATURES);
        let prediction = self
            .pipeline
            .predict(&row)?
            .to_vec()
            .first()
            .copied()
            .ok_or_else(|| PredictError::Model("model returned no output".into()))?;
        if !prediction.is_finite() {
            return Err(PredictError::Model(format!(
                "model returned a non-finite value ({prediction})"
            )));
        }
        debug!("predicted {prediction:.2} km for {:?}", features.as_slice());
        Ok(prediction)
    }

    /// Training report stored with the model.
    pub fn report(&self) -> &TrainingReport {
        &self.report
    }
}

static PREDICTOR: OnceCell<Predictor> = OnceCell::new();

/// Loads the process-wide predictor from `path` on first call.
///
/// Later calls return the already loaded instance whatever `path` they pass.
/// A failed load leaves the handle empty so the caller can report it and exit.
pub fn init<P: AsRef<Path>>(path: P) -> Result<&'static Predictor, ModelLoadError> {
    PREDICTOR.get_or_try_init(|| Predictor::load(path))
}

pub fn global() -> Result<&'static Predictor, ModelLoadError> {
    PREDICTOR.get().ok_or(ModelLoadError::Uninitialized)
}

/// [`Predictor::predict_range`] on the process-wide predictor.
pub fn predict_range(features: &HashMap<String, Value>) -> Result<f64, PredictError> {
    global()
        .map_err(|e| PredictError::Model(e.to_string()))?
        .predict_range(features)
}
