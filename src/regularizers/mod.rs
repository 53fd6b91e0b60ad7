use crate::backend::{Backend, Scalar, Tensor1D};
use crate::model::linear::{LinearParams, LinearRegression};
use crate::model::TrainableModel;

/// Weight penalty added to the loss during training.
///
/// Returns the penalty value and its gradient w.r.t. the model parameters.
pub trait Regularizer<B: Backend, M: TrainableModel<B>> {
    fn regularizer_penalty_grad(&self, model: &M) -> (Scalar<B>, M::Gradients);
}

/// Ridge penalty `λ‖w‖²`; the bias is not penalised.
#[derive(Clone, Debug)]
pub struct L2<B: Backend> {
    lambda: Scalar<B>,
}

impl<B: Backend> L2<B> {
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda: Scalar::new(lambda),
        }
    }
}

impl<B: Backend> Regularizer<B, LinearRegression<B>> for L2<B> {
    fn regularizer_penalty_grad(&self, model: &LinearRegression<B>) -> (Scalar<B>, LinearParams<B>) {
        let w = &model.params().weights;
        let penalty = self.lambda * w.dot(w);
        let grad = LinearParams {
            weights: w.scale(&(self.lambda * Scalar::new(2.0))),
            bias: Scalar::new(0.0),
        };
        (penalty, grad)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoRegularizer;

impl<B: Backend> Regularizer<B, LinearRegression<B>> for NoRegularizer {
    fn regularizer_penalty_grad(&self, model: &LinearRegression<B>) -> (Scalar<B>, LinearParams<B>) {
        let grad = LinearParams {
            weights: Tensor1D::zeros(model.params().weights.len()),
            bias: Scalar::new(0.0),
        };
        (Scalar::new(0.0), grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    fn model(w: Vec<f64>) -> LinearRegression<CpuBackend> {
        LinearRegression::from_params(LinearParams {
            weights: Tensor1D::new(w),
            bias: Scalar::new(7.0),
        })
    }

    #[test]
    fn test_l2_penalty_and_grad() {
        let (penalty, grad) = L2::<CpuBackend>::new(0.5).regularizer_penalty_grad(&model(vec![1.0, -2.0]));

        // 0.5 * (1 + 4)
        assert_eq!(penalty.to_f64(), 2.5);
        assert_eq!(grad.weights.to_vec(), vec![1.0, -2.0]);
        assert_eq!(grad.bias.to_f64(), 0.0);
    }

    #[test]
    fn test_no_regularizer_is_zero() {
        let (penalty, grad) = NoRegularizer.regularizer_penalty_grad(&model(vec![1.0, 2.0, 3.0]));
        assert_eq!(penalty.to_f64(), 0.0);
        assert_eq!(grad.weights.to_vec(), vec![0.0; 3]);
    }
}
