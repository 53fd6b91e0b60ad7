//! Regression metrics on host slices.

use serde::{Deserialize, Serialize};

/// Regression metrics.
pub struct Metrics;

impl Metrics {
    /// `mean((y_true - y_pred)²)`; zero for empty input.
    ///
    /// # Panics
    /// If the slices differ in length.
    pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();
        sum_sq / y_true.len() as f64
    }

    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        Self::mse(y_true, y_pred).sqrt()
    }

    /// `mean(|y_true - y_pred|)`; zero for empty input.
    pub fn mae(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let sum_abs: f64 = y_true.iter().zip(y_pred).map(|(&t, &p)| (t - p).abs()).sum();
        sum_abs / y_true.len() as f64
    }

    /// Coefficient of determination `1 - SS_res / SS_tot`.
    ///
    /// Negative when the model is worse than predicting the mean. A constant
    /// target scores 1 only for an exact fit. Undefined (NaN) for fewer than
    /// two samples.
    pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");
        if y_true.len() < 2 {
            return f64::NAN;
        }
        let mean_true = y_true.iter().sum::<f64>() / y_true.len() as f64;
        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();
        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true).powi(2)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }

    pub fn calculate_all(y_true: &[f64], y_pred: &[f64]) -> RegressionMetrics {
        RegressionMetrics {
            mse: Self::mse(y_true, y_pred),
            rmse: Self::rmse(y_true, y_pred),
            mae: Self::mae(y_true, y_pred),
            r_squared: Self::r_squared(y_true, y_pred),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: f64,
}
