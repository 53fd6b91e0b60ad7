//! Offline training run: split, optional search, fit, held-out evaluation.
//!
//! Everything here is deterministic for a fixed [`TrainConfig::seed`]. Metrics
//! in the [`TrainingReport`] come from the held-out partition only.

use crate::artifact::ModelArtifact;
use crate::backend::{CpuBackend, Tensor1D, Tensor2D};
use crate::config::{Hyperparams, TrainConfig};
use crate::data::EvDataset;
use crate::dataset::{train_test_split, InMemoryDataset};
use crate::error::TrainError;
use crate::loss::{Loss, MAELoss, MSELoss};
use crate::metrics::{Metrics, RegressionMetrics};
use crate::model::linear::{LinearModel, LinearParams, LinearRegression};
use crate::model::Fitted;
use crate::optimizer::SGD;
use crate::preprocessing::{
    FittedTransformer, PolynomialFeatures, PredictivePipeline, PreprocessingError, StandardScaler,
    Transformer,
};
use crate::regularizers::{NoRegularizer, Regularizer, L2};
use crate::schema::FEATURES;
use crate::trainer::{Trainer, TrainerError};
use crate::tuning;
use log::{info, log_enabled, Level};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Increase in held-out MAE when one column is shuffled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub mae_increase: f64,
}

/// Summary of one training run, stored inside the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub hyperparams: Hyperparams,
    /// Mean cross-validated R² of the chosen candidate when the search ran.
    pub cv_r2: Option<f64>,
    /// Sorted by `mae_increase`, largest first.
    pub feature_importance: Vec<FeatureImportance>,
}

/// Fitted pipeline plus its report.
pub struct TrainOutcome {
    pub pipeline: PredictivePipeline<CpuBackend>,
    pub report: TrainingReport,
}

impl TrainOutcome {
    pub fn artifact(&self) -> ModelArtifact {
        ModelArtifact::new(&self.pipeline, self.report.clone())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TrainError> {
        self.artifact().save(path)
    }
}

/// Fits scaler, optional polynomial expansion and linear model on `data`.
///
/// The linear bias starts at the target mean so SGD only has to learn the
/// deviations.
pub fn fit_pipeline(
    data: &InMemoryDataset,
    hp: &Hyperparams,
    seed: u64,
) -> Result<PredictivePipeline<CpuBackend>, TrainError> {
    hp.validate()?;
    let x = data.x_tensor::<CpuBackend>();
    let scaler = StandardScaler::<CpuBackend>::new().fit(&x)?;
    let scaled = scaler.transform(&x)?;

    let (poly, design) = if hp.poly_degree > 1 {
        let poly = PolynomialFeatures::<CpuBackend>::new()
            .with_degree(hp.poly_degree)
            .fit(&scaled)?;
        let expanded = poly.transform(&scaled)?;
        (Some(poly), expanded)
    } else {
        (None, scaled)
    };

    let design = InMemoryDataset::new(design.to_rows(), data.targets().to_vec())?;
    let y_mean = data.y_tensor::<CpuBackend>().mean();
    let model = LinearRegression::from_params(LinearParams {
        weights: Tensor1D::zeros(design.n_features()),
        bias: y_mean,
    });

    let fitted = if hp.l2 > 0.0 {
        fit_linear(model, &design, hp, seed, L2::new(hp.l2))?
    } else {
        fit_linear(model, &design, hp, seed, NoRegularizer)?
    };

    Ok(PredictivePipeline::new(scaler, poly, fitted)?)
}

fn fit_linear<R>(
    model: LinearRegression<CpuBackend>,
    data: &InMemoryDataset,
    hp: &Hyperparams,
    seed: u64,
    regularizer: R,
) -> Result<LinearModel<CpuBackend, Fitted>, TrainerError>
where
    R: Regularizer<CpuBackend, LinearRegression<CpuBackend>>,
{
    let trainer: Trainer<
        CpuBackend,
        MSELoss,
        SGD<CpuBackend>,
        LinearRegression<CpuBackend>,
        LinearParams<CpuBackend>,
        R,
    > = Trainer::builder(MSELoss, SGD::new(hp.learning_rate), regularizer)
        .batch_size(hp.batch_size)
        .max_epochs(hp.epochs)
        .shuffle(seed)
        .verbose(log_enabled!(Level::Debug))
        .build();
    trainer.fit(model, data)
}

/// Predictions of `pipeline` for every row of `data`.
pub fn predict_rows(
    pipeline: &PredictivePipeline<CpuBackend>,
    data: &InMemoryDataset,
) -> Result<Vec<f64>, TrainError> {
    let preds = pipeline.predict(&data.x_tensor())?.to_vec();
    if preds.iter().any(|p| !p.is_finite()) {
        return Err(PreprocessingError::NumericalError(
            "model produced non-finite predictions".into(),
        )
        .into());
    }
    Ok(preds)
}

pub fn evaluate(
    pipeline: &PredictivePipeline<CpuBackend>,
    data: &InMemoryDataset,
) -> Result<RegressionMetrics, TrainError> {
    let preds = predict_rows(pipeline, data)?;
    Ok(Metrics::calculate_all(data.targets(), &preds))
}

/// Permutation importance of every schema column on `data`.
///
/// Column `j` is shuffled with a generator seeded from `seed + j`; the score
/// is the resulting MAE minus the baseline MAE.
pub fn permutation_importance(
    pipeline: &PredictivePipeline<CpuBackend>,
    data: &InMemoryDataset,
    seed: u64,
) -> Result<Vec<FeatureImportance>, TrainError> {
    let y = data.y_tensor::<CpuBackend>();
    let mae = |x: &Tensor2D<CpuBackend>| -> Result<f64, TrainError> {
        let preds = pipeline.predict(x)?;
        Ok(MAELoss.loss(&preds, &y).to_f64())
    };
    let baseline = mae(&data.x_tensor())?;

    let mut scores = Vec::with_capacity(data.n_features());
    for (j, name) in FEATURES.iter().enumerate().take(data.n_features()) {
        let mut rows = data.features().to_vec();
        let mut column: Vec<f64> = rows.iter().map(|r| r[j]).collect();
        column.shuffle(&mut StdRng::seed_from_u64(seed.wrapping_add(j as u64)));
        for (row, v) in rows.iter_mut().zip(column) {
            row[j] = v;
        }
        let shuffled = InMemoryDataset::new(rows, data.targets().to_vec())?;
        scores.push(FeatureImportance {
            feature: name.to_string(),
            mae_increase: mae(&shuffled.x_tensor())? - baseline,
        });
    }
    scores.sort_by(|a, b| b.mae_increase.total_cmp(&a.mae_increase));
    Ok(scores)
}

/// Trains on `data` according to `cfg` without touching the filesystem.
pub fn train(cfg: &TrainConfig, data: &EvDataset) -> Result<TrainOutcome, TrainError> {
    cfg.validate()?;
    if data.len() < 2 {
        return Err(TrainError::InsufficientData(format!(
            "{} usable rows, need at least 2",
            data.len()
        )));
    }

    let split = train_test_split(data.len(), cfg.test_fraction, cfg.seed)?;
    if split.test.len() < 2 {
        return Err(TrainError::InsufficientData(format!(
            "{} usable rows leave {} held-out row(s); R² needs at least 2",
            data.len(),
            split.test.len()
        )));
    }
    let train_set = data.select(&split.train)?;
    let test_set = data.select(&split.test)?;
    info!(
        "split {} rows into {} train / {} test",
        data.len(),
        train_set.n_samples(),
        test_set.n_samples()
    );

    let (hyperparams, cv_r2) = if cfg.tune {
        let result = tuning::randomized_search(&train_set, &cfg.search, cfg.seed)?;
        info!(
            "best candidate: {:?} (cv r2 = {:.4})",
            result.best, result.best_score
        );
        (result.best, Some(result.best_score))
    } else {
        (cfg.hyperparams.clone(), None)
    };

    let pipeline = fit_pipeline(&train_set, &hyperparams, cfg.seed)?;
    let metrics = evaluate(&pipeline, &test_set)?;
    let feature_importance = permutation_importance(&pipeline, &test_set, cfg.seed)?;

    let report = TrainingReport {
        mae: metrics.mae,
        rmse: metrics.rmse,
        r2: metrics.r_squared,
        n_train: train_set.n_samples(),
        n_test: test_set.n_samples(),
        hyperparams,
        cv_r2,
        feature_importance,
    };
    info!(
        "held-out MAE = {:.3}, RMSE = {:.3}, R² = {:.4}",
        report.mae, report.rmse, report.r2
    );
    Ok(TrainOutcome { pipeline, report })
}

/// Loads the CSV named by `cfg`, trains, and writes the artifact.
pub fn run(cfg: &TrainConfig) -> Result<TrainOutcome, TrainError> {
    let data = EvDataset::from_csv(&cfg.data_path)?;
    let outcome = train(cfg, &data)?;
    outcome.save(&cfg.model_path)?;
    Ok(outcome)
}
