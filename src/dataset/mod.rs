//! Dataset abstractions for mini-batch training.
//!
//! A [`Dataset`] is a source of `(X, y)` pairs where `X` has shape
//! `(n_samples, n_features)` and `y` has shape `(n_samples,)`.
//! [`DatasetBatchIter`] walks it in batches, either sequentially or in a
//! caller-supplied order (used for per-epoch shuffling).
//!
//! # Example
//!
//! ```rust
//! use ev_range::dataset::{Dataset, InMemoryDataset};
//! use ev_range::backend::CpuBackend;
//!
//! let x = vec![vec![1.0], vec![2.0]];
//! let y = vec![0.0, 1.0];
//! let dataset = InMemoryDataset::new(x, y).unwrap();
//!
//! for batch in dataset.batches::<CpuBackend>(1) {
//!     let (x_batch, y_batch) = batch.unwrap();
//!     assert_eq!(x_batch.shape().0, y_batch.len());
//! }
//! ```

use crate::backend::{Backend, Tensor1D, Tensor2D};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::Range;
use thiserror::Error;

pub mod memory;
pub mod split;

pub use self::memory::InMemoryDataset;
pub use self::split::{k_fold, train_test_split, Fold, Split};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DatasetError {
    #[error("x has {x_rows} rows but y has {y_len} values")]
    LengthMismatch { x_rows: usize, y_len: usize },

    #[error("dataset is empty")]
    Empty,

    #[error("row {row} has {got} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("sample index {index} out of bounds for {len} samples")]
    OutOfBounds { index: usize, len: usize },

    #[error("invalid split: {0}")]
    InvalidSplit(String),
}

/// Source of `(X, y)` training data.
pub trait Dataset {
    type Error: Debug + 'static;

    /// Number of samples, if known.
    fn len(&self) -> Option<usize>;

    fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Sequential batches; the last one may be smaller.
    fn batches<B: Backend>(&self, batch_size: usize) -> DatasetBatchIter<'_, B, Self>
    where
        Self: Sized,
    {
        DatasetBatchIter {
            dataset: self,
            batch_size: batch_size.max(1),
            current: 0,
            order: None,
            _backend: PhantomData,
        }
    }

    /// Batches drawn in the given sample order.
    fn batches_in_order<B: Backend>(
        &self,
        batch_size: usize,
        order: Vec<usize>,
    ) -> DatasetBatchIter<'_, B, Self>
    where
        Self: Sized,
    {
        DatasetBatchIter {
            dataset: self,
            batch_size: batch_size.max(1),
            current: 0,
            order: Some(order),
            _backend: PhantomData,
        }
    }

    /// Loads samples `[range.start, range.end)`.
    fn get_batch<B: Backend>(
        &self,
        range: Range<usize>,
    ) -> Result<(Tensor2D<B>, Tensor1D<B>), Self::Error>;

    /// Loads an arbitrary set of samples, in the given order.
    fn get_rows<B: Backend>(
        &self,
        indices: &[usize],
    ) -> Result<(Tensor2D<B>, Tensor1D<B>), Self::Error>;
}

/// Iterator over dataset batches, created by [`Dataset::batches`] or
/// [`Dataset::batches_in_order`].
pub struct DatasetBatchIter<'a, B: Backend, D: ?Sized> {
    dataset: &'a D,
    batch_size: usize,
    current: usize,
    order: Option<Vec<usize>>,
    _backend: PhantomData<B>,
}

impl<B: Backend, D: Dataset> Iterator for DatasetBatchIter<'_, B, D> {
    type Item = Result<(Tensor2D<B>, Tensor1D<B>), D::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let total = match &self.order {
            Some(order) => order.len(),
            None => self.dataset.len()?,
        };
        if self.current >= total {
            return None;
        }

        let end = (self.current + self.batch_size).min(total);
        let range = self.current..end;
        self.current = end;

        match &self.order {
            Some(order) => Some(self.dataset.get_rows::<B>(&order[range])),
            None => Some(self.dataset.get_batch::<B>(range)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    struct MockDataset {
        len: usize,
    }

    impl MockDataset {
        fn rows<B: Backend>(&self, idx: &[usize]) -> Result<(Tensor2D<B>, Tensor1D<B>), &'static str> {
            if idx.iter().any(|&i| i >= self.len) {
                return Err("index out of bounds");
            }
            // X row i = [2i, 2i + 1], y_i = i
            let x: Vec<f64> = idx
                .iter()
                .flat_map(|&i| [(2 * i) as f64, (2 * i + 1) as f64])
                .collect();
            let y = idx.iter().map(|&i| i as f64).collect();
            Ok((Tensor2D::new(x, idx.len(), 2), Tensor1D::new(y)))
        }
    }

    impl Dataset for MockDataset {
        type Error = &'static str;

        fn len(&self) -> Option<usize> {
            Some(self.len)
        }

        fn get_batch<B: Backend>(
            &self,
            range: Range<usize>,
        ) -> Result<(Tensor2D<B>, Tensor1D<B>), Self::Error> {
            let idx: Vec<usize> = range.collect();
            self.rows(&idx)
        }

        fn get_rows<B: Backend>(
            &self,
            indices: &[usize],
        ) -> Result<(Tensor2D<B>, Tensor1D<B>), Self::Error> {
            self.rows(indices)
        }
    }

    #[test]
    fn test_dataset_is_empty() {
        assert!(MockDataset { len: 0 }.is_empty());
        assert!(!MockDataset { len: 1 }.is_empty());
    }

    #[test]
    fn test_batches_full() {
        let dataset = MockDataset { len: 6 };
        let mut iter = dataset.batches::<CpuBackend>(2);

        for i in 0..3 {
            let (x, y) = iter.next().unwrap().unwrap();
            assert_eq!(x.shape(), (2, 2));
            assert_eq!(y.to_vec(), vec![i as f64 * 2.0, i as f64 * 2.0 + 1.0]);
        }
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_batches_partial_last() {
        let dataset = MockDataset { len: 5 };
        let shapes: Vec<_> = dataset
            .batches::<CpuBackend>(2)
            .map(|b| b.unwrap().0.shape())
            .collect();
        assert_eq!(shapes, vec![(2, 2), (2, 2), (1, 2)]);
    }

    #[test]
    fn test_batches_empty_dataset() {
        let dataset = MockDataset { len: 0 };
        assert!(dataset.batches::<CpuBackend>(2).next().is_none());
    }

    #[test]
    fn test_batches_in_order_follow_permutation() {
        let dataset = MockDataset { len: 4 };
        let ys: Vec<Vec<f64>> = dataset
            .batches_in_order::<CpuBackend>(3, vec![3, 0, 2, 1])
            .map(|b| b.unwrap().1.to_vec())
            .collect();
        assert_eq!(ys, vec![vec![3.0, 0.0, 2.0], vec![1.0]]);
    }

    #[test]
    fn test_batches_in_order_propagate_errors() {
        let dataset = MockDataset { len: 2 };
        let first = dataset.batches_in_order::<CpuBackend>(2, vec![0, 5]).next();
        assert!(matches!(first, Some(Err(_))));
    }
}
