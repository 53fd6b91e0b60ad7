//! `ev-range` command line tool.
//!
//! Trains the range model offline and answers predictions from the saved
//! artifact, either from explicit specs or from a free-text question.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use ev_range::artifact::ModelArtifact;
use ev_range::assistant::{self, Answer};
use ev_range::config::{resolve_model_path, TrainConfig};
use ev_range::predictor;
use ev_range::schema::{Feature, FeatureVector};
use ev_range::training;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ev-range")]
#[command(about = "Electric vehicle range estimation", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a CSV and save the model artifact
    Train {
        /// Dataset CSV
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Where to write the artifact
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// JSON training config; flags override its values
        #[arg(short, long, env = "EV_RANGE_CONFIG")]
        config: Option<PathBuf>,

        /// Run the randomized hyperparameter search first
        #[arg(long)]
        tune: bool,

        #[arg(long)]
        seed: Option<u64>,

        /// Held-out fraction
        #[arg(long)]
        test_size: Option<f64>,
    },

    /// Predict range from explicit specs
    Predict {
        #[command(flatten)]
        specs: Specs,

        /// JSON object with the seven named features instead of the flags
        #[arg(
            long,
            conflicts_with_all = [
                "battery", "top_speed", "efficiency", "acceleration", "length", "width", "height",
            ]
        )]
        json: Option<String>,

        /// Model artifact (default: $EV_RANGE_MODEL or models/ev_range_model.bin)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Ask a free-text question, optionally with rough specs
    Ask {
        question: String,

        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Show the metadata and training report stored in an artifact
    Inspect {
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Number of largest linear coefficients to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

/// Form inputs; defaults describe a compact crossover.
#[derive(Args)]
struct Specs {
    /// Battery capacity (kWh), 10-150
    #[arg(long, default_value_t = 50.0)]
    battery: f64,

    /// Top speed (km/h), 80-300
    #[arg(long, default_value_t = 180.0)]
    top_speed: f64,

    /// Efficiency (Wh/km), 100-300
    #[arg(long, default_value_t = 160.0)]
    efficiency: f64,

    /// 0-100 km/h time (s), 2.5-20
    #[arg(long, default_value_t = 8.5)]
    acceleration: f64,

    /// Length (mm), 3000-5500
    #[arg(long, default_value_t = 4300.0)]
    length: f64,

    /// Width (mm), 1500-2200
    #[arg(long, default_value_t = 1800.0)]
    width: f64,

    /// Height (mm), 1400-2000
    #[arg(long, default_value_t = 1600.0)]
    height: f64,
}

impl Specs {
    fn to_vector(&self) -> Result<FeatureVector> {
        let v = FeatureVector::new([
            self.battery,
            self.top_speed,
            self.efficiency,
            self.acceleration,
            self.length,
            self.width,
            self.height,
        ]);
        let out = v.out_of_bounds();
        if !out.is_empty() {
            let msgs: Vec<String> = out
                .iter()
                .map(|f| {
                    let b = f.bounds();
                    format!(
                        "{} must be within {}-{}, got {}",
                        f.label(),
                        b.start(),
                        b.end(),
                        v.get(*f)
                    )
                })
                .collect();
            bail!("{}", msgs.join("; "));
        }
        Ok(v)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            model,
            config,
            tune,
            seed,
            test_size,
        } => {
            let mut cfg = match config {
                Some(path) => TrainConfig::from_json_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => TrainConfig::default(),
            };
            if let Some(data) = data {
                cfg.data_path = data;
            }
            if let Some(model) = model {
                cfg.model_path = model;
            }
            if let Some(seed) = seed {
                cfg.seed = seed;
            }
            if let Some(f) = test_size {
                cfg.test_fraction = f;
            }
            cfg.tune |= tune;
            cfg.validate().context("invalid training options")?;
            train(&cfg)
        }
        Commands::Predict { specs, json, model } => {
            predictor::init(resolve_model_path(model)).context("loading model")?;
            let km = match json {
                Some(text) => {
                    let map: HashMap<String, Value> =
                        serde_json::from_str(&text).context("--json must be a JSON object")?;
                    predictor::predict_range(&map)?
                }
                None => predictor::global()?.predict_vector(&specs.to_vector()?)?,
            };
            println!("Estimated range: ~{km:.1} km");
            Ok(())
        }
        Commands::Ask { question, model } => {
            let p = predictor::init(resolve_model_path(model)).context("loading model")?;
            match assistant::answer(p, &question) {
                Answer::Error(msg) => bail!(msg),
                reply => {
                    println!("{reply}");
                    Ok(())
                }
            }
        }
        Commands::Inspect { model, top } => inspect(resolve_model_path(model), top),
    }
}

fn train(cfg: &TrainConfig) -> Result<()> {
    let outcome = training::run(cfg)
        .with_context(|| format!("training on {}", cfg.data_path.display()))?;
    let r = &outcome.report;

    println!("Held-out MAE:  {:.2} km", r.mae);
    println!("Held-out RMSE: {:.2} km", r.rmse);
    println!("Held-out R²:   {:.4}", r.r2);
    println!("Rows: {} train / {} test", r.n_train, r.n_test);
    if let Some(cv) = r.cv_r2 {
        println!("Best CV R²:    {cv:.4}");
    }
    println!("Hyperparameters: {:?}", r.hyperparams);
    print_importance(r);
    println!("Model saved to {}", cfg.model_path.display());
    Ok(())
}

fn inspect(path: PathBuf, top: usize) -> Result<()> {
    let artifact =
        ModelArtifact::load(&path).with_context(|| format!("reading {}", path.display()))?;
    let r = &artifact.report;

    println!("Artifact:  {}", path.display());
    println!("Format:    v{}", artifact.format_version);
    println!("Target:    {}", artifact.target);
    println!("Features:");
    for name in &artifact.features {
        let label = Feature::from_name(name).map_or("?", Feature::label);
        println!("  {name:<24} {label}");
    }
    println!(
        "Pipeline:  scaler -> {} -> linear ({} weights)",
        artifact
            .pipeline
            .poly
            .as_ref()
            .map_or("no expansion".to_string(), |p| format!("degree {} expansion", p.degree)),
        artifact.pipeline.model.weights.len()
    );
    println!("Held-out MAE {:.2} km, RMSE {:.2} km, R² {:.4}", r.mae, r.rmse, r.r2);
    println!("Trained on {} rows, evaluated on {}", r.n_train, r.n_test);
    println!("Hyperparameters: {:?}", r.hyperparams);
    print_importance(r);

    let coefs = artifact.coefficients()?;
    println!("Largest coefficients (km per std. unit):");
    for (name, w) in coefs.iter().take(top) {
        println!("  {name:<48} {w:>10.3}");
    }
    Ok(())
}

fn print_importance(r: &training::TrainingReport) {
    if r.feature_importance.is_empty() {
        return;
    }
    println!("Permutation importance (MAE increase, km):");
    for f in &r.feature_importance {
        println!("  {:<24} {:>8.2}", f.feature, f.mae_increase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_json_conflicts_with_spec_flags() {
        let err = Cli::try_parse_from(["ev-range", "predict", "--json", "{}", "--battery", "70"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_json_alone_and_flags_alone_parse() {
        let cli = Cli::try_parse_from(["ev-range", "predict", "--json", "{}"]).unwrap();
        assert!(matches!(cli.command, Commands::Predict { json: Some(_), .. }));

        let cli = Cli::try_parse_from(["ev-range", "predict", "--battery", "70"]).unwrap();
        match cli.command {
            Commands::Predict { specs, json, .. } => {
                assert_eq!(specs.battery, 70.0);
                assert_eq!(specs.height, 1600.0);
                assert!(json.is_none());
            }
            _ => panic!("expected predict"),
        }
    }
}
