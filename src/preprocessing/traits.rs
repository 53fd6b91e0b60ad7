//! Fit/transform split for preprocessing steps.
//!
//! A [`Transformer`] only carries settings; fitting it yields a
//! [`FittedTransformer`] whose learned state is plain serialisable data.
//! That state travels inside the model artifact, never in a file of its own.

use crate::backend::Backend;
use crate::preprocessing::error::PreprocessingError;
use crate::serialization::SerializableParams;

pub trait Transformer<B: Backend>: Clone {
    type Input;
    type Output;
    type Params: SerializableParams;
    type Fitted: FittedTransformer<B, Params = Self::Params, Input = Self::Input, Output = Self::Output>;

    /// Fails on empty input, non-finite values or a shape the step cannot take.
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError>;
}

/// Round-trips through [`Self::extract_params`] / [`Self::from_params`].
pub trait FittedTransformer<B: Backend>: Clone {
    type Input;
    type Output;
    type Params: SerializableParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError>;
    fn extract_params(&self) -> Self::Params;
    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError>
    where
        Self: Sized;
    /// Column count the step was fitted on.
    fn n_features_in(&self) -> usize;
}
