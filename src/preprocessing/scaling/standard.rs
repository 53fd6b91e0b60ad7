//! Z-score scaling: `z = (x - mean) / std` per column.
//!
//! `std` is the population standard deviation of the training column. A
//! constant column is given `std = 1` so it maps to zero rather than NaN.

use crate::backend::{Backend, Tensor1D, Tensor2D};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Learned column statistics, as stored in the artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct StandardScaler<B: Backend> {
    _backend: PhantomData<B>,
}

impl<B: Backend> Default for StandardScaler<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> StandardScaler<B> {
    pub fn new() -> Self {
        Self {
            _backend: PhantomData,
        }
    }
}

impl<B: Backend> Transformer<B> for StandardScaler<B> {
    type Input = Tensor2D<B>;
    type Output = Tensor2D<B>;
    type Params = StandardScalerParams;
    type Fitted = FittedStandardScaler<B>;

    fn fit(&self, data: &Tensor2D<B>) -> Result<FittedStandardScaler<B>, PreprocessingError> {
        if data.rows() == 0 {
            return Err(PreprocessingError::EmptyData("no rows to fit the scaler on".into()));
        }
        if data.to_vec().iter().any(|x| !x.is_finite()) {
            return Err(PreprocessingError::NumericalError(
                "scaler input has NaN or infinite values".into(),
            ));
        }

        let std = data
            .col_std(0)
            .to_vec()
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Ok(FittedStandardScaler {
            mean: data.col_mean(),
            std: Tensor1D::new(std),
        })
    }
}

#[derive(Clone)]
pub struct FittedStandardScaler<B: Backend> {
    mean: Tensor1D<B>,
    std: Tensor1D<B>,
}

impl<B: Backend> FittedStandardScaler<B> {
    pub fn mean(&self) -> &Tensor1D<B> {
        &self.mean
    }

    pub fn std(&self) -> &Tensor1D<B> {
        &self.std
    }
}

impl<B: Backend> FittedTransformer<B> for FittedStandardScaler<B> {
    type Input = Tensor2D<B>;
    type Output = Tensor2D<B>;
    type Params = StandardScalerParams;

    fn transform(&self, data: &Tensor2D<B>) -> Result<Tensor2D<B>, PreprocessingError> {
        let cols = data.cols();
        if cols != self.n_features_in() {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.n_features_in(),
                got_features: cols,
            });
        }
        let centred = B::broadcast_sub_1d_to_2d_rows(&data.data, &self.mean.data);
        Ok(Tensor2D::from_raw(B::broadcast_div_1d_to_2d_rows(&centred, &self.std.data)))
    }

    fn extract_params(&self) -> StandardScalerParams {
        StandardScalerParams {
            mean: self.mean.to_vec(),
            std: self.std.to_vec(),
        }
    }

    fn from_params(params: StandardScalerParams) -> Result<Self, PreprocessingError> {
        let StandardScalerParams { mean, std } = params;
        if mean.len() != std.len() || mean.is_empty() {
            return Err(PreprocessingError::InvalidShape {
                expected: "equal, non-zero numbers of means and stds".into(),
                got: format!("{} means, {} stds", mean.len(), std.len()),
            });
        }
        let bad_std = std.iter().any(|&s| !s.is_finite() || s == 0.0);
        if bad_std || mean.iter().any(|m| !m.is_finite()) {
            return Err(PreprocessingError::InvalidParameter(
                "scaler statistics must be finite with non-zero std".into(),
            ));
        }
        Ok(Self {
            mean: Tensor1D::new(mean),
            std: Tensor1D::new(std),
        })
    }

    fn n_features_in(&self) -> usize {
        self.mean.len()
    }
}
