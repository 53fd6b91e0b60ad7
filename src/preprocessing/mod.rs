//! Feature preprocessing for the range regressor.
//!
//! Transformers follow the same type-state split as models: an unfitted
//! [`Transformer`] learns parameters and yields a [`FittedTransformer`] that
//! can be serialized and reused at inference.
//!
//! - [`StandardScaler`]: z-score normalisation.
//! - [`PolynomialFeatures`]: squares and pairwise interactions.
//! - [`PredictivePipeline`]: scaler, optional polynomial expansion and a
//!   fitted linear model evaluated as one unit.

pub mod error;
pub mod feature_engineering;
pub mod predictive_pipeline;
pub mod scaling;
pub mod traits;

pub use error::PreprocessingError;
pub use feature_engineering::{FittedPolynomialFeatures, PolynomialFeatures, PolynomialFeaturesParams};
pub use predictive_pipeline::{PredictivePipeline, PredictivePipelineParams};
pub use scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
pub use traits::{FittedTransformer, Transformer};
