use crate::backend::{Backend, Scalar};
use crate::model::linear::LinearParams;

/// Gradient-based parameter update.
///
/// Optimizers are decoupled from the training loop: the [`Trainer`](crate::trainer::Trainer)
/// computes gradients and hands them here, getting back a new parameter set.
///
/// # Example
/// ```rust
/// use ev_range::backend::{CpuBackend, Scalar, Tensor1D};
/// use ev_range::model::linear::LinearParams;
/// use ev_range::optimizer::{Optimizer, SGD};
///
/// let params = LinearParams {
///     weights: Tensor1D::<CpuBackend>::new(vec![1.0, 2.0]),
///     bias: Scalar::new(0.5),
/// };
/// let grads = LinearParams {
///     weights: Tensor1D::new(vec![10.0, -10.0]),
///     bias: Scalar::new(5.0),
/// };
/// let updated = SGD::<CpuBackend>::new(0.1).step(&params, &grads);
/// assert_eq!(updated.weights.to_vec(), vec![0.0, 3.0]);
/// ```
pub trait Optimizer<B: Backend, P> {
    /// `params - lr * gradients`, returned as a new value.
    fn step(&self, params: &P, gradients: &P) -> P;
}

/// Plain stochastic gradient descent: `θ ← θ - η·∇L(θ)`.
#[derive(Clone, Debug)]
pub struct SGD<B: Backend> {
    lr: Scalar<B>,
}

impl<B: Backend> SGD<B> {
    pub fn new(lr: f64) -> Self {
        Self { lr: Scalar::new(lr) }
    }

    pub fn learning_rate(&self) -> f64 {
        self.lr.to_f64()
    }
}

impl<B: Backend> Optimizer<B, LinearParams<B>> for SGD<B> {
    fn step(&self, params: &LinearParams<B>, grads: &LinearParams<B>) -> LinearParams<B> {
        let neg_lr = Scalar::new(0.0) - self.lr;
        LinearParams {
            weights: params.weights.add(&grads.weights.scale(&neg_lr)),
            bias: params.bias - grads.bias * self.lr,
        }
    }
}
