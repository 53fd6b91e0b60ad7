//! Differentiable losses for regression.
//!
//! A loss reports a scalar value for logging and the gradient w.r.t. the
//! model's predictions, which is fed into `TrainableModel::backward`.

use crate::backend::{Backend, Scalar, Tensor1D};

pub trait Loss<B: Backend> {
    type Prediction;
    type Target;

    fn loss(&self, prediction: &Self::Prediction, target: &Self::Target) -> Scalar<B>;

    /// `∂L/∂prediction`.
    fn grad_wrt_prediction(
        &self,
        prediction: &Self::Prediction,
        target: &Self::Target,
    ) -> Self::Prediction;
}

/// Mean squared error: `L = (1/n) Σ (pᵢ - yᵢ)²`.
///
/// The gradient is returned as `(p - y) / n`; the factor 2 is absorbed by the
/// learning rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MSELoss;

impl<B: Backend> Loss<B> for MSELoss {
    type Prediction = Tensor1D<B>;
    type Target = Tensor1D<B>;

    fn loss(&self, pred: &Self::Prediction, target: &Self::Target) -> Scalar<B> {
        let diff = pred.sub(target);
        diff.dot(&diff) / Scalar::new(diff.len().max(1) as f64)
    }

    fn grad_wrt_prediction(&self, pred: &Self::Prediction, target: &Self::Target) -> Tensor1D<B> {
        let n = Scalar::new(1.0 / pred.len().max(1) as f64);
        pred.sub(target).scale(&n)
    }
}

/// Mean absolute error: `L = (1/n) Σ |pᵢ - yᵢ|`, subgradient 0 at a tie.
#[derive(Debug, Clone, Copy, Default)]
pub struct MAELoss;

impl<B: Backend> Loss<B> for MAELoss {
    type Prediction = Tensor1D<B>;
    type Target = Tensor1D<B>;

    fn loss(&self, pred: &Self::Prediction, target: &Self::Target) -> Scalar<B> {
        pred.sub(target).abs().mean()
    }

    fn grad_wrt_prediction(&self, pred: &Self::Prediction, target: &Self::Target) -> Tensor1D<B> {
        let n = Scalar::new(1.0 / pred.len().max(1) as f64);
        pred.sub(target).sign().scale(&n)
    }
}
