mod polynomial;

pub use polynomial::{FittedPolynomialFeatures, PolynomialFeatures, PolynomialFeaturesParams};
