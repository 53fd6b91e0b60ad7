//! Randomized hyperparameter search with k-fold cross validation.
//!
//! Candidates are drawn without replacement from the grid spanned by a
//! [`SearchSpace`] and scored by mean validation R² over the folds of the
//! training partition. The held-out partition never reaches this module.

use crate::config::{Hyperparams, SearchSpace};
use crate::dataset::{k_fold, InMemoryDataset};
use crate::error::TrainError;
use crate::training::{evaluate, fit_pipeline};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Scored candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub hyperparams: Hyperparams,
    /// `None` when a fold failed to fit or scored non-finite.
    pub cv_r2: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best: Hyperparams,
    pub best_score: f64,
    pub candidates: Vec<Candidate>,
}

/// Every combination of the space, in a fixed nesting order.
pub fn grid(space: &SearchSpace) -> Vec<Hyperparams> {
    let mut out = Vec::new();
    for &learning_rate in &space.learning_rates {
        for &epochs in &space.epochs {
            for &batch_size in &space.batch_sizes {
                for &l2 in &space.l2 {
                    for &poly_degree in &space.poly_degrees {
                        out.push(Hyperparams {
                            learning_rate,
                            epochs,
                            batch_size,
                            l2,
                            poly_degree,
                        });
                    }
                }
            }
        }
    }
    out
}

/// Up to `space.n_iter` distinct grid points, shuffled with `seed`.
pub fn sample_candidates(space: &SearchSpace, seed: u64) -> Vec<Hyperparams> {
    let mut all = grid(space);
    all.shuffle(&mut StdRng::seed_from_u64(seed));
    all.truncate(space.n_iter);
    all
}

fn cross_validate(
    data: &InMemoryDataset,
    hp: &Hyperparams,
    cv: usize,
    seed: u64,
) -> Result<f64, TrainError> {
    let folds = k_fold(data.n_samples(), cv, seed)?;
    let mut total = 0.0;
    for fold in &folds {
        let train = data.subset(&fold.train)?;
        let validation = data.subset(&fold.validation)?;
        let pipeline = fit_pipeline(&train, hp, seed)?;
        total += evaluate(&pipeline, &validation)?.r_squared;
    }
    Ok(total / folds.len() as f64)
}

/// Scores every sampled candidate and returns the best by mean CV R².
///
/// A candidate whose fit diverges, or whose score is not finite, is kept in
/// [`SearchResult::candidates`] with no score. Fails with
/// [`TrainError::SearchFailed`] when no candidate scores.
pub fn randomized_search(
    data: &InMemoryDataset,
    space: &SearchSpace,
    seed: u64,
) -> Result<SearchResult, TrainError> {
    space.validate()?;
    // every validation fold needs two rows for R² to be defined
    if data.n_samples() < 2 * space.cv {
        return Err(TrainError::InsufficientData(format!(
            "{} training rows cannot form {} folds of at least 2",
            data.n_samples(),
            space.cv
        )));
    }

    let sampled = sample_candidates(space, seed);
    info!(
        "randomized search: {} candidates x {} folds",
        sampled.len(),
        space.cv
    );

    let mut candidates = Vec::with_capacity(sampled.len());
    for hp in sampled {
        let cv_r2 = match cross_validate(data, &hp, space.cv, seed) {
            Ok(score) if score.is_finite() => Some(score),
            Ok(score) => {
                warn!("discarding {hp:?}: cv score {score}");
                None
            }
            Err(e) => {
                warn!("discarding {hp:?}: {e}");
                None
            }
        };
        debug!("candidate {hp:?}: cv r2 = {cv_r2:?}");
        candidates.push(Candidate {
            hyperparams: hp,
            cv_r2,
        });
    }

    // first candidate wins ties
    let best = candidates
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.cv_r2.map(|s| (i, s)))
        .fold(None::<(usize, f64)>, |acc, (i, s)| match acc {
            Some((_, best)) if best >= s => acc,
            _ => Some((i, s)),
        });

    match best {
        Some((i, score)) => Ok(SearchResult {
            best: candidates[i].hyperparams.clone(),
            best_score: score,
            candidates,
        }),
        None => Err(TrainError::SearchFailed(format!(
            "all {} candidates diverged or failed",
            candidates.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> SearchSpace {
        SearchSpace {
            learning_rates: vec![0.01, 0.05],
            epochs: vec![60],
            batch_sizes: vec![8, 16],
            l2: vec![0.0, 0.01],
            poly_degrees: vec![1, 2],
            n_iter: 4,
            cv: 3,
        }
    }

    fn data() -> InMemoryDataset {
        let x: Vec<Vec<f64>> = (0..30)
            .map(|i| {
                let t = i as f64;
                vec![
                    40.0 + (t * 7.0) % 50.0,
                    150.0 + (t * 11.0) % 90.0,
                    140.0 + (t * 13.0) % 70.0,
                    4.0 + (t * 3.0) % 7.0,
                    4000.0 + (t * 37.0) % 800.0,
                    1750.0 + (t * 17.0) % 150.0,
                    1450.0 + (t * 23.0) % 250.0,
                ]
            })
            .collect();
        let y = x.iter().map(|r| 5.0 * r[0] - 1.5 * r[2] + 200.0).collect();
        InMemoryDataset::new(x, y).unwrap()
    }

    #[test]
    fn test_grid_size() {
        assert_eq!(grid(&space()).len(), 16);
        assert_eq!(grid(&SearchSpace::default()).len(), 4 * 3 * 3 * 4 * 2);
    }

    #[test]
    fn test_sampling_is_seeded_and_distinct() {
        let a = sample_candidates(&space(), 42);
        assert_eq!(a, sample_candidates(&space(), 42));
        assert_eq!(a.len(), 4);
        for (i, x) in a.iter().enumerate() {
            assert!(a[i + 1..].iter().all(|y| y != x));
        }
    }

    #[test]
    fn test_n_iter_larger_than_grid() {
        let s = SearchSpace {
            n_iter: 100,
            ..space()
        };
        assert_eq!(sample_candidates(&s, 1).len(), 16);
    }

    #[test]
    fn test_search_picks_scored_candidate() {
        let result = randomized_search(&data(), &space(), 42).unwrap();
        assert_eq!(result.candidates.len(), 4);
        let best_scored = result
            .candidates
            .iter()
            .filter_map(|c| c.cv_r2)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(result.best_score, best_scored);
        assert!(result.best_score > 0.5);
    }

    #[test]
    fn test_folds_of_one_row_are_rejected() {
        let five = data().subset(&[0, 1, 2, 3, 4]).unwrap();
        assert!(matches!(
            randomized_search(&five, &space(), 42),
            Err(TrainError::InsufficientData(_))
        ));
        let six = data().subset(&[0, 1, 2, 3, 4, 5]).unwrap();
        assert!(!matches!(
            randomized_search(&six, &space(), 42),
            Err(TrainError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_all_divergent_fails() {
        let s = SearchSpace {
            learning_rates: vec![1e4],
            epochs: vec![200],
            batch_sizes: vec![30],
            l2: vec![0.0],
            poly_degrees: vec![2],
            n_iter: 1,
            cv: 3,
        };
        assert!(matches!(
            randomized_search(&data(), &s, 0),
            Err(TrainError::SearchFailed(_))
        ));
    }
}
