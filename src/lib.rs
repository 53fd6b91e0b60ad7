//! # ev-range
//!
//! Electric vehicle range estimation from seven numeric vehicle attributes.
//!
//! The crate has two layers:
//!
//! - a small typed ML core: tensor [`backend`]s, [`model`]s whose fitted state
//!   is tracked in the type system, a mini-batch [`trainer`], [`loss`]es,
//!   [`optimizer`]s, [`regularizers`], [`preprocessing`] and [`dataset`]
//!   utilities;
//! - the range model on top of it: the feature [`schema`], the CSV [`data`]
//!   loader, offline [`training`] and [`tuning`], the persisted [`artifact`],
//!   the serving-side [`predictor`] and the free-text [`assistant`].
//!
//! ## Example
//!
//! ```no_run
//! use ev_range::predictor;
//! use ev_range::schema::FeatureVector;
//!
//! let model = predictor::init("models/ev_range_model.bin")?;
//! let km = model.predict_vector(&FeatureVector::default())?;
//! println!("Estimated range: ~{km:.1} km");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod dataset;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod optimizer;
pub mod preprocessing;
pub mod regularizers;
pub mod serialization;
pub mod trainer;

pub mod config;
pub mod error;
pub mod schema;

#[cfg(feature = "cpu")]
pub mod artifact;
#[cfg(feature = "cpu")]
pub mod assistant;
pub mod data;
#[cfg(feature = "cpu")]
pub mod predictor;
#[cfg(feature = "cpu")]
pub mod training;
#[cfg(feature = "cpu")]
pub mod tuning;

pub use backend::{Backend, Scalar, Tensor1D, Tensor2D};
#[cfg(feature = "cpu")]
pub use backend::CpuBackend;
pub use config::{Hyperparams, SearchSpace, TrainConfig};
pub use error::{ConfigError, DataError, ModelLoadError, PredictError, TrainError};
pub use model::{Fitted, InferenceModel, TrainableModel, Unfitted};
#[cfg(feature = "cpu")]
pub use predictor::{predict_range, Predictor};
pub use schema::{Feature, FeatureVector, FEATURES, TARGET};
