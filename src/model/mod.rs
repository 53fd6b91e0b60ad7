//! Typestate models.
//!
//! The [`Trainer`](crate::trainer::Trainer) drives an `Unfitted` model through
//! [`TrainableModel`] and hands back the `Fitted` form, which can only predict
//! ([`InferenceModel`]) and be turned back into plain parameters.

pub mod state;
pub use state::{Fitted, Unfitted};

pub mod linear;

use crate::backend::{Backend, Scalar};
use crate::serialization::SerializableParams;
use std::error::Error;

pub trait TrainableModel<B: Backend> {
    type Input;
    type Prediction;
    type Params;
    type Gradients;
    /// The inference-only form returned once training ends.
    type Output;

    fn forward(&self, input: &Self::Input) -> Self::Prediction;
    /// Parameter gradients from `∂L/∂prediction`.
    fn backward(&self, input: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients;
    fn params(&self) -> &Self::Params;
    fn update_params(&mut self, new_params: &Self::Params);
    fn into_fitted(self) -> Self::Output;
}

/// Parameter-set arithmetic for optimizer steps and penalty gradients.
pub trait ParamOps<B: Backend>: Clone {
    fn add(&self, other: &Self) -> Self;
    fn scale(&self, scalar: Scalar<B>) -> Self;
}

pub trait InferenceModel<B: Backend> {
    type InputSingle;
    type OutputSingle;
    type InputBatch;
    type OutputBatch;
    /// What gets written into the artifact.
    type ParamsRepr: SerializableParams;

    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle;
    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch;
    fn extract_params(&self) -> Self::ParamsRepr;
    fn from_params(params: Self::ParamsRepr) -> Result<Self, Box<dyn Error + Send + Sync>>
    where
        Self: Sized;
}
