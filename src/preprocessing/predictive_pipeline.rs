//! Preprocessing and model inference as one unit.

use crate::backend::{Backend, Tensor1D, Tensor2D};
use crate::model::linear::{LinearModel, SerializableLinearParams};
use crate::model::{Fitted, InferenceModel};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::feature_engineering::{FittedPolynomialFeatures, PolynomialFeaturesParams};
use crate::preprocessing::scaling::{FittedStandardScaler, StandardScalerParams};
use crate::preprocessing::traits::FittedTransformer;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictivePipelineParams {
    pub scaler: StandardScalerParams,
    pub poly: Option<PolynomialFeaturesParams>,
    pub model: SerializableLinearParams,
}

/// Fitted scaler, optional polynomial expansion and fitted linear model.
///
/// Input rows are raw features in training column order; output is one
/// prediction per row.
#[derive(Clone)]
pub struct PredictivePipeline<B: Backend> {
    scaler: FittedStandardScaler<B>,
    poly: Option<FittedPolynomialFeatures<B>>,
    model: LinearModel<B, Fitted>,
}

impl<B: Backend> PredictivePipeline<B> {
    /// Assembles a pipeline, checking that every stage's width matches the next.
    pub fn new(
        scaler: FittedStandardScaler<B>,
        poly: Option<FittedPolynomialFeatures<B>>,
        model: LinearModel<B, Fitted>,
    ) -> Result<Self, PreprocessingError> {
        let scaled = scaler.n_features_in();
        let model_in = match &poly {
            Some(p) => {
                if p.n_features_in() != scaled {
                    return Err(PreprocessingError::FeatureMismatch {
                        expected_features: scaled,
                        got_features: p.n_features_in(),
                    });
                }
                p.n_features_out()
            }
            None => scaled,
        };
        if model.n_features() != model_in {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: model_in,
                got_features: model.n_features(),
            });
        }
        Ok(Self { scaler, poly, model })
    }

    pub fn n_features_in(&self) -> usize {
        self.scaler.n_features_in()
    }

    pub fn scaler(&self) -> &FittedStandardScaler<B> {
        &self.scaler
    }

    pub fn poly(&self) -> Option<&FittedPolynomialFeatures<B>> {
        self.poly.as_ref()
    }

    pub fn model(&self) -> &LinearModel<B, Fitted> {
        &self.model
    }

    /// Scaling followed by the optional polynomial expansion.
    pub fn preprocess(&self, data: &Tensor2D<B>) -> Result<Tensor2D<B>, PreprocessingError> {
        let scaled = self.scaler.transform(data)?;
        match &self.poly {
            Some(poly) => poly.transform(&scaled),
            None => Ok(scaled),
        }
    }

    pub fn predict(&self, data: &Tensor2D<B>) -> Result<Tensor1D<B>, PreprocessingError> {
        let processed = self.preprocess(data)?;
        Ok(self.model.predict_batch(&processed))
    }

    pub fn extract_params(&self) -> PredictivePipelineParams {
        PredictivePipelineParams {
            scaler: self.scaler.extract_params(),
            poly: self.poly.as_ref().map(|p| p.extract_params()),
            model: self.model.extract_params(),
        }
    }

    pub fn from_params(params: PredictivePipelineParams) -> Result<Self, PreprocessingError> {
        let scaler = FittedStandardScaler::<B>::from_params(params.scaler)?;
        let poly = params
            .poly
            .map(|p| FittedPolynomialFeatures::<B>::from_params(p))
            .transpose()?;
        let model = LinearModel::<B, Fitted>::from_params(params.model)
            .map_err(|e| PreprocessingError::InvalidParameter(e.to_string()))?;
        Self::new(scaler, poly, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CpuBackend, Scalar};
    use crate::model::linear::LinearParams;
    use crate::preprocessing::{PolynomialFeatures, StandardScaler, Transformer};

    fn x() -> Tensor2D<CpuBackend> {
        Tensor2D::new(vec![0.0, 10.0, 2.0, 30.0], 2, 2)
    }

    fn linear(w: Vec<f64>, b: f64) -> LinearModel<CpuBackend, Fitted> {
        LinearModel::<CpuBackend, Fitted>::new(LinearParams {
            weights: Tensor1D::new(w),
            bias: Scalar::new(b),
        })
    }

    #[test]
    fn test_predict_scales_before_model() {
        let scaler = StandardScaler::<CpuBackend>::new().fit(&x()).unwrap();
        let pipeline = PredictivePipeline::new(scaler, None, linear(vec![1.0, 0.0], 100.0)).unwrap();

        // column 0 standardises to [-1, 1]
        assert_eq!(pipeline.predict(&x()).unwrap().to_vec(), vec![99.0, 101.0]);
    }

    #[test]
    fn test_new_rejects_width_mismatch() {
        let scaler = StandardScaler::<CpuBackend>::new().fit(&x()).unwrap();
        let scaled = scaler.transform(&x()).unwrap();
        let poly = PolynomialFeatures::<CpuBackend>::new().fit(&scaled).unwrap();

        assert!(PredictivePipeline::new(scaler, Some(poly), linear(vec![1.0, 1.0], 0.0)).is_err());
    }

    #[test]
    fn test_params_rebuild_same_predictions() {
        let scaler = StandardScaler::<CpuBackend>::new().fit(&x()).unwrap();
        let poly = PolynomialFeatures::<CpuBackend>::new()
            .fit(&scaler.transform(&x()).unwrap())
            .unwrap();
        let pipeline =
            PredictivePipeline::new(scaler, Some(poly), linear(vec![1.0, -2.0, 0.5, 0.25, 3.0], 7.0))
                .unwrap();

        let rebuilt = PredictivePipeline::<CpuBackend>::from_params(pipeline.extract_params()).unwrap();
        assert_eq!(
            rebuilt.predict(&x()).unwrap().to_vec(),
            pipeline.predict(&x()).unwrap().to_vec()
        );
    }
}
