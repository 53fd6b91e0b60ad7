mod standard;

pub use standard::{FittedStandardScaler, StandardScaler, StandardScalerParams};
