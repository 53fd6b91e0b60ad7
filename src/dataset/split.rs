//! Seeded index splits: hold-out and k-fold.
//!
//! Both functions work on sample indices so the caller decides how rows are
//! materialised (see [`InMemoryDataset::subset`](super::InMemoryDataset::subset)).

use super::DatasetError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Disjoint train/test index sets covering `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// One cross-validation fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

fn shuffled(n: usize, seed: u64) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(&mut StdRng::seed_from_u64(seed));
    idx
}

/// Shuffles `0..n` and holds out `ceil(n * test_fraction)` indices.
///
/// Fails when either side would be empty.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<Split, DatasetError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DatasetError::InvalidSplit(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    let n_test = (n as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(DatasetError::InvalidSplit(format!(
            "{n} samples cannot be split with test fraction {test_fraction}"
        )));
    }

    let mut idx = shuffled(n, seed);
    let train = idx.split_off(n_test);
    Ok(Split { train, test: idx })
}

/// Shuffled k-fold partition of `0..n`.
///
/// The first `n % k` folds get one extra validation sample.
pub fn k_fold(n: usize, k: usize, seed: u64) -> Result<Vec<Fold>, DatasetError> {
    if k < 2 || k > n {
        return Err(DatasetError::InvalidSplit(format!(
            "cannot make {k} folds from {n} samples"
        )));
    }

    let idx = shuffled(n, seed);
    let (base, extra) = (n / k, n % k);
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for f in 0..k {
        let size = base + usize::from(f < extra);
        let end = start + size;
        let validation = idx[start..end].to_vec();
        let train = idx[..start].iter().chain(&idx[end..]).copied().collect();
        folds.push(Fold { train, validation });
        start = end;
    }
    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes_use_ceil() {
        let s = train_test_split(11, 0.2, 42).unwrap();
        assert_eq!(s.test.len(), 3);
        assert_eq!(s.train.len(), 8);
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let s = train_test_split(50, 0.2, 7).unwrap();
        let train: HashSet<_> = s.train.iter().copied().collect();
        assert!(s.test.iter().all(|i| !train.contains(i)));
        let mut all: Vec<_> = s.train.iter().chain(&s.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        assert_eq!(
            train_test_split(40, 0.25, 42).unwrap(),
            train_test_split(40, 0.25, 42).unwrap()
        );
        assert_ne!(
            train_test_split(40, 0.25, 42).unwrap(),
            train_test_split(40, 0.25, 43).unwrap()
        );
    }

    #[test]
    fn test_split_rejects_degenerate() {
        assert!(train_test_split(1, 0.2, 0).is_err());
        assert!(train_test_split(10, 0.0, 0).is_err());
        assert!(train_test_split(10, 1.0, 0).is_err());
    }

    #[test]
    fn test_k_fold_covers_every_index_once() {
        let folds = k_fold(10, 3, 1).unwrap();
        let sizes: Vec<_> = folds.iter().map(|f| f.validation.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);

        let mut seen: Vec<_> = folds.iter().flat_map(|f| f.validation.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());

        for f in &folds {
            assert_eq!(f.train.len() + f.validation.len(), 10);
        }
    }

    #[test]
    fn test_k_fold_rejects_bad_k() {
        assert!(k_fold(10, 1, 0).is_err());
        assert!(k_fold(2, 3, 0).is_err());
    }
}
