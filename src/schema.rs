//! The feature schema shared by training, inference and text extraction.
//!
//! [`FEATURES`] is the only place the column names and their order are
//! written down; every other module goes through it or through [`Feature`].

use crate::error::PredictError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

/// Schema column names in model input order.
pub const FEATURES: [&str; 7] = [
    "battery_capacity_kWh",
    "top_speed_kmh",
    "efficiency_wh_per_km",
    "acceleration_0_100_s",
    "length_mm",
    "width_mm",
    "height_mm",
];

/// Regression target column.
pub const TARGET: &str = "range_km";

pub const N_FEATURES: usize = FEATURES.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    BatteryCapacity,
    TopSpeed,
    Efficiency,
    Acceleration,
    Length,
    Width,
    Height,
}

impl Feature {
    /// All features in schema order.
    pub const ALL: [Feature; N_FEATURES] = [
        Feature::BatteryCapacity,
        Feature::TopSpeed,
        Feature::Efficiency,
        Feature::Acceleration,
        Feature::Length,
        Feature::Width,
        Feature::Height,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        FEATURES[self.index()]
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Form label with unit.
    pub fn label(self) -> &'static str {
        match self {
            Feature::BatteryCapacity => "Battery capacity (kWh)",
            Feature::TopSpeed => "Top speed (km/h)",
            Feature::Efficiency => "Efficiency (Wh/km)",
            Feature::Acceleration => "0-100 km/h (s)",
            Feature::Length => "Length (mm)",
            Feature::Width => "Width (mm)",
            Feature::Height => "Height (mm)",
        }
    }

    /// Input guardrail for the form surface. The predictor does not enforce it.
    pub fn bounds(self) -> RangeInclusive<f64> {
        match self {
            Feature::BatteryCapacity => 10.0..=150.0,
            Feature::TopSpeed => 80.0..=300.0,
            Feature::Efficiency => 100.0..=300.0,
            Feature::Acceleration => 2.5..=20.0,
            Feature::Length => 3000.0..=5500.0,
            Feature::Width => 1500.0..=2200.0,
            Feature::Height => 1400.0..=2000.0,
        }
    }

    /// Form default: a compact crossover.
    pub fn default_value(self) -> f64 {
        match self {
            Feature::BatteryCapacity => 50.0,
            Feature::TopSpeed => 180.0,
            Feature::Efficiency => 160.0,
            Feature::Acceleration => 8.5,
            Feature::Length => 4300.0,
            Feature::Width => 1800.0,
            Feature::Height => 1600.0,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One fully specified input row, in schema order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    pub fn new(values: [f64; N_FEATURES]) -> Self {
        Self(values)
    }

    /// Validates and coerces a named, dynamically typed mapping.
    ///
    /// Missing schema keys are reported first, all of them, in schema order.
    /// Only then is each value coerced: JSON numbers as-is, strings parsed
    /// after trimming. Anything else, or a non-finite result, is a
    /// [`PredictError::TypeConversion`]. Keys outside the schema are ignored.
    pub fn from_map(map: &HashMap<String, Value>) -> Result<Self, PredictError> {
        let missing: Vec<String> = FEATURES
            .iter()
            .filter(|k| !map.contains_key(**k))
            .map(|k| k.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PredictError::MissingFeatures(missing));
        }

        let mut values = [0.0; N_FEATURES];
        for (slot, name) in values.iter_mut().zip(FEATURES) {
            // presence checked above
            if let Some(v) = map.get(name) {
                *slot = coerce(name, v)?;
            }
        }
        Ok(Self(values))
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.0[feature.index()] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_map(&self) -> HashMap<String, Value> {
        FEATURES
            .iter()
            .zip(self.0)
            .map(|(k, v)| (k.to_string(), Value::from(v)))
            .collect()
    }

    /// Features whose value lies outside [`Feature::bounds`].
    pub fn out_of_bounds(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| !f.bounds().contains(&self.get(*f)))
            .collect()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self(Feature::ALL.map(Feature::default_value))
    }
}

impl From<[f64; N_FEATURES]> for FeatureVector {
    fn from(values: [f64; N_FEATURES]) -> Self {
        Self(values)
    }
}

fn coerce(feature: &str, value: &Value) -> Result<f64, PredictError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(x) if x.is_finite() => Ok(x),
        _ => Err(PredictError::TypeConversion {
            feature: feature.to_string(),
            value: value.to_string(),
        }),
    }
}
