//! Linear regression with compile-time state tracking.
//!
//! - [`LinearRegression`] (`LinearModel<B, Unfitted>`) is what the trainer drives.
//! - `LinearModel<B, Fitted>` is the inference-only regressor that ends up in
//!   the range model artifact.
//!
//! The fitted model carries no training hyperparameters; L2 penalties and
//! learning rates live in the regularizer and optimizer.

use crate::backend::{Backend, Scalar, Tensor1D, Tensor2D};
use crate::model::{Fitted, InferenceModel, ParamOps, TrainableModel, Unfitted};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::marker::PhantomData;

/// Weights and bias of a linear model.
#[derive(Clone)]
pub struct LinearParams<B: Backend> {
    pub weights: Tensor1D<B>,
    pub bias: Scalar<B>,
}

impl<B: Backend> LinearParams<B> {
    pub fn zeros(n_features: usize) -> Self {
        Self {
            weights: Tensor1D::zeros(n_features),
            bias: Scalar::new(0.0),
        }
    }

    /// `true` when every weight and the bias are finite.
    pub fn is_finite(&self) -> bool {
        self.bias.to_f64().is_finite() && self.weights.to_vec().iter().all(|w| w.is_finite())
    }
}

/// Plain-data form of [`LinearParams`] stored inside the model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableLinearParams {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl<B: Backend> From<&LinearParams<B>> for SerializableLinearParams {
    fn from(params: &LinearParams<B>) -> Self {
        Self {
            weights: params.weights.to_vec(),
            bias: params.bias.to_f64(),
        }
    }
}

impl<B: Backend> TryFrom<SerializableLinearParams> for LinearParams<B> {
    type Error = Box<dyn Error + Send + Sync>;

    fn try_from(value: SerializableLinearParams) -> Result<Self, Self::Error> {
        if !value.bias.is_finite() || value.weights.iter().any(|w| !w.is_finite()) {
            return Err("linear parameters contain non-finite values".into());
        }
        Ok(Self {
            weights: Tensor1D::new(value.weights),
            bias: Scalar::new(value.bias),
        })
    }
}

impl<B: Backend> ParamOps<B> for LinearParams<B> {
    fn add(&self, other: &Self) -> Self {
        Self {
            weights: self.weights.add(&other.weights),
            bias: self.bias + other.bias,
        }
    }

    fn scale(&self, scalar: Scalar<B>) -> Self {
        Self {
            weights: self.weights.scale(&scalar),
            bias: self.bias * scalar,
        }
    }
}

/// Linear model `y = wᵀx + b` whose state `S` is either [`Unfitted`] or [`Fitted`].
pub struct LinearModel<B: Backend, S> {
    params: LinearParams<B>,
    _state: PhantomData<S>,
}

impl<B: Backend, S> Clone for LinearModel<B, S> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            _state: PhantomData,
        }
    }
}

impl<B: Backend> LinearModel<B, Fitted> {
    pub fn new(params: LinearParams<B>) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    pub fn weights(&self) -> Vec<f64> {
        self.params.weights.to_vec()
    }

    pub fn bias(&self) -> f64 {
        self.params.bias.to_f64()
    }

    pub fn n_features(&self) -> usize {
        self.params.weights.len()
    }
}

impl<B: Backend> InferenceModel<B> for LinearModel<B, Fitted> {
    type InputSingle = Tensor1D<B>;
    type InputBatch = Tensor2D<B>;
    type OutputSingle = Scalar<B>;
    type OutputBatch = Tensor1D<B>;
    type ParamsRepr = SerializableLinearParams;

    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle {
        self.params.weights.dot(input) + self.params.bias
    }

    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch {
        input
            .dot(&self.params.weights)
            .add_scalar(&self.params.bias)
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        (&self.params).into()
    }

    fn from_params(params: Self::ParamsRepr) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self::new(LinearParams::try_from(params)?))
    }
}

/// Forward pass `X @ w + b`; backward pass `∇w = Xᵀ·g`, `∇b = Σg`.
impl<B: Backend> TrainableModel<B> for LinearModel<B, Unfitted> {
    type Params = LinearParams<B>;
    type Gradients = LinearParams<B>;
    type Prediction = Tensor1D<B>;
    type Input = Tensor2D<B>;
    type Output = LinearModel<B, Fitted>;

    fn forward(&self, x: &Self::Input) -> Self::Prediction {
        x.dot(&self.params.weights).add_scalar(&self.params.bias)
    }

    fn backward(&self, x: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients {
        LinearParams {
            weights: x.tdot(grad_output),
            bias: grad_output.sum(),
        }
    }

    fn params(&self) -> &Self::Params {
        &self.params
    }

    fn update_params(&mut self, params: &Self::Params) {
        self.params = params.clone();
    }

    fn into_fitted(self) -> LinearModel<B, Fitted> {
        LinearModel::<B, Fitted>::new(self.params)
    }
}

/// Unfitted linear regression, the input to [`Trainer::fit`](crate::trainer::Trainer::fit).
pub type LinearRegression<B> = LinearModel<B, Unfitted>;

impl<B: Backend> LinearRegression<B> {
    /// Zero-initialised model over `n_features` inputs.
    pub fn new(n_features: usize) -> Self {
        Self::from_params(LinearParams::zeros(n_features))
    }

    /// Warm start from explicit parameters.
    pub fn from_params(params: LinearParams<B>) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    fn params(w: Vec<f64>, b: f64) -> LinearParams<CpuBackend> {
        LinearParams {
            weights: Tensor1D::new(w),
            bias: Scalar::new(b),
        }
    }

    #[test]
    fn test_param_ops_add() {
        let result = params(vec![1.0, 2.0], 0.5).add(&params(vec![0.5, 1.0], 0.5));
        assert_eq!(result.weights.to_vec(), vec![1.5, 3.0]);
        assert_eq!(result.bias.to_f64(), 1.0);
    }

    #[test]
    fn test_param_ops_scale_negative() {
        let result = params(vec![2.0], 1.0).scale(Scalar::new(-1.0));
        assert_eq!(result.weights.to_vec(), vec![-2.0]);
        assert_eq!(result.bias.to_f64(), -1.0);
    }

    #[test]
    fn test_linear_regression_new_zero_initialized() {
        let model = LinearRegression::<CpuBackend>::new(3);
        assert_eq!(model.params().weights.to_vec(), vec![0.0, 0.0, 0.0]);
        assert_eq!(model.params().bias.to_f64(), 0.0);
    }

    #[test]
    fn test_forward_correctness() {
        let model = LinearRegression::<CpuBackend>::from_params(params(vec![2.0, 3.0], 1.0));
        // [[1, 0], [0, 1]] -> [2 + 1, 3 + 1]
        let x = Tensor2D::<CpuBackend>::new(vec![1.0, 0.0, 0.0, 1.0], 2, 2);
        assert_eq!(model.forward(&x).to_vec(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_backward_gradients() {
        let model = LinearRegression::<CpuBackend>::new(2);
        let x = Tensor2D::<CpuBackend>::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let g = Tensor1D::<CpuBackend>::new(vec![1.0, -1.0]);

        let grads = model.backward(&x, &g);
        assert_eq!(grads.weights.to_vec(), vec![-2.0, -2.0]);
        assert_eq!(grads.bias.to_f64(), 0.0);
    }

    #[test]
    fn test_fitted_predict_single_and_batch_agree() {
        let fitted = LinearRegression::<CpuBackend>::from_params(params(vec![0.5, -1.0], 2.0))
            .into_fitted();
        let single = fitted.predict(&Tensor1D::new(vec![4.0, 1.0])).to_f64();
        let batch = fitted.predict_batch(&Tensor2D::new(vec![4.0, 1.0, 0.0, 0.0], 2, 2));

        assert_eq!(single, 3.0);
        assert_eq!(batch.to_vec(), vec![3.0, 2.0]);
    }

    #[test]
    fn test_from_params_rejects_nan() {
        let bad = SerializableLinearParams {
            weights: vec![1.0, f64::NAN],
            bias: 0.0,
        };
        assert!(LinearModel::<CpuBackend, Fitted>::from_params(bad).is_err());
    }

    #[test]
    fn test_params_survive_bytes() -> Result<(), Box<dyn Error + Send + Sync>> {
        use crate::serialization::SerializableParams;

        let fitted = LinearModel::<CpuBackend, Fitted>::new(params(vec![1.25, -0.5], 3.0));
        let bytes = fitted.extract_params().to_bytes()?;
        let restored = SerializableLinearParams::from_bytes(&bytes)?;
        let loaded = LinearModel::<CpuBackend, Fitted>::from_params(restored)?;

        assert_eq!(loaded.weights(), vec![1.25, -0.5]);
        assert_eq!(loaded.bias(), 3.0);
        Ok(())
    }
}
