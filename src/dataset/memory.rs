use super::{Dataset, DatasetError};
use crate::backend::{Backend, Tensor1D, Tensor2D};
use std::ops::Range;

/// Row-major dataset held entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    x: Vec<Vec<f64>>,
    y: Vec<f64>,
    n_features: usize,
}

impl InMemoryDataset {
    pub fn new(x: Vec<Vec<f64>>, y: Vec<f64>) -> Result<Self, DatasetError> {
        if x.len() != y.len() {
            return Err(DatasetError::LengthMismatch {
                x_rows: x.len(),
                y_len: y.len(),
            });
        }
        let n_features = x.first().map(Vec::len).ok_or(DatasetError::Empty)?;
        if let Some((row, r)) = x.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(DatasetError::RaggedRow {
                row,
                expected: n_features,
                got: r.len(),
            });
        }
        Ok(Self { x, y, n_features })
    }

    pub fn n_samples(&self) -> usize {
        self.x.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.x
    }

    pub fn targets(&self) -> &[f64] {
        &self.y
    }

    /// New dataset made of the given rows, in order.
    pub fn subset(&self, indices: &[usize]) -> Result<Self, DatasetError> {
        let len = self.x.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(DatasetError::OutOfBounds { index, len });
        }
        let x = indices.iter().map(|&i| self.x[i].clone()).collect();
        let y = indices.iter().map(|&i| self.y[i]).collect();
        Self::new(x, y)
    }

    /// Whole feature matrix as a tensor.
    pub fn x_tensor<B: Backend>(&self) -> Tensor2D<B> {
        let data = self.x.iter().flatten().copied().collect();
        Tensor2D::new(data, self.x.len(), self.n_features)
    }

    pub fn y_tensor<B: Backend>(&self) -> Tensor1D<B> {
        Tensor1D::new(self.y.clone())
    }
}

impl Dataset for InMemoryDataset {
    type Error = DatasetError;

    fn len(&self) -> Option<usize> {
        Some(self.x.len())
    }

    fn get_batch<B: Backend>(
        &self,
        range: Range<usize>,
    ) -> Result<(Tensor2D<B>, Tensor1D<B>), Self::Error> {
        let len = self.x.len();
        if range.end > len || range.start > range.end {
            return Err(DatasetError::OutOfBounds {
                index: range.end,
                len,
            });
        }
        let batch_x = &self.x[range.clone()];
        let data = batch_x.iter().flatten().copied().collect();
        Ok((
            Tensor2D::new(data, batch_x.len(), self.n_features),
            Tensor1D::new(self.y[range].to_vec()),
        ))
    }

    fn get_rows<B: Backend>(
        &self,
        indices: &[usize],
    ) -> Result<(Tensor2D<B>, Tensor1D<B>), Self::Error> {
        let len = self.x.len();
        let mut data = Vec::with_capacity(indices.len() * self.n_features);
        let mut y = Vec::with_capacity(indices.len());
        for &i in indices {
            if i >= len {
                return Err(DatasetError::OutOfBounds { index: i, len });
            }
            data.extend_from_slice(&self.x[i]);
            y.push(self.y[i]);
        }
        Ok((
            Tensor2D::new(data, indices.len(), self.n_features),
            Tensor1D::new(y),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    fn sample() -> InMemoryDataset {
        InMemoryDataset::new(
            vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
            vec![10.0, 20.0, 30.0],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = InMemoryDataset::new(vec![vec![1.0]], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err, DatasetError::LengthMismatch { x_rows: 1, y_len: 2 });
    }

    #[test]
    fn test_rejects_empty_and_ragged() {
        assert_eq!(
            InMemoryDataset::new(vec![], vec![]).unwrap_err(),
            DatasetError::Empty
        );
        assert!(matches!(
            InMemoryDataset::new(vec![vec![1.0, 2.0], vec![3.0]], vec![0.0, 0.0]),
            Err(DatasetError::RaggedRow { row: 1, .. })
        ));
    }

    #[test]
    fn test_get_batch_range() {
        let (x, y) = sample().get_batch::<CpuBackend>(1..3).unwrap();
        assert_eq!(x.to_vec(), vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(y.to_vec(), vec![20.0, 30.0]);
    }

    #[test]
    fn test_get_rows_and_subset() {
        let ds = sample();
        let (_, y) = ds.get_rows::<CpuBackend>(&[2, 0]).unwrap();
        assert_eq!(y.to_vec(), vec![30.0, 10.0]);

        let sub = ds.subset(&[1]).unwrap();
        assert_eq!(sub.features(), &[vec![3.0, 4.0]]);
        assert!(ds.subset(&[3]).is_err());
    }
}
