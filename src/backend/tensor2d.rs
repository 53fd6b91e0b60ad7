use super::tensor1d::Tensor1D;
use crate::backend::Backend;
use std::marker::PhantomData;

/// Backend-typed row-major 2D tensor (samples × features).
#[derive(Clone)]
pub struct Tensor2D<B: Backend> {
    pub(crate) data: B::Tensor2D,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> Tensor2D<B> {
    /// # Panics
    /// If `data.len() != rows * cols`.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        Self::from_raw(B::from_vec_2d(data, rows, cols))
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_raw(B::zeros_2d(rows, cols))
    }

    /// Builds a tensor from equally sized rows.
    ///
    /// Returns `None` when the rows are ragged.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let n_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != n_cols) {
            return None;
        }
        let flat = rows.iter().flatten().copied().collect();
        Some(Self::new(flat, rows.len(), n_cols))
    }

    pub(crate) fn from_raw(data: B::Tensor2D) -> Self {
        Self {
            data,
            backend: PhantomData,
        }
    }

    /// Matrix-vector product `self @ v`.
    pub fn dot(&self, v: &Tensor1D<B>) -> Tensor1D<B> {
        Tensor1D::from_raw(B::matvec(&self.data, &v.data))
    }

    /// Transposed product `selfᵀ @ v`.
    pub fn tdot(&self, v: &Tensor1D<B>) -> Tensor1D<B> {
        Tensor1D::from_raw(B::matvec_transposed(&self.data, &v.data))
    }

    pub fn col_mean(&self) -> Tensor1D<B> {
        Tensor1D::from_raw(B::col_mean_2d(&self.data))
    }

    pub fn col_std(&self, ddof: usize) -> Tensor1D<B> {
        Tensor1D::from_raw(B::col_std_2d(&self.data, ddof))
    }

    pub fn shape(&self) -> (usize, usize) {
        B::shape(&self.data)
    }

    pub fn rows(&self) -> usize {
        self.shape().0
    }

    pub fn cols(&self) -> usize {
        self.shape().1
    }

    /// Row-major copy of all elements.
    pub fn to_vec(&self) -> Vec<f64> {
        B::to_vec_2d(&self.data)
    }

    /// Host copy split into rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let (rows, cols) = self.shape();
        if cols == 0 {
            return vec![Vec::new(); rows];
        }
        self.to_vec().chunks(cols).map(<[f64]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    #[test]
    fn test_tensor2d_matvec_ops() {
        // A = [[1, 2],
        //      [3, 4]]
        let a = Tensor2D::<CpuBackend>::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let x = Tensor1D::<CpuBackend>::new(vec![1.0, 0.0]);

        assert_eq!(a.dot(&x).to_vec(), vec![1.0, 3.0]);
        assert_eq!(a.tdot(&x).to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_tensor2d_column_stats() {
        let a = Tensor2D::<CpuBackend>::new(vec![1.0, 10.0, 3.0, 30.0], 2, 2);
        assert_eq!(a.col_mean().to_vec(), vec![2.0, 20.0]);
        assert_eq!(a.col_std(0).to_vec(), vec![1.0, 10.0]);
    }

    #[test]
    fn test_tensor2d_rows_roundtrip() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let t = Tensor2D::<CpuBackend>::from_rows(&rows).unwrap();
        assert_eq!(t.shape(), (2, 3));
        assert_eq!(t.to_rows(), rows);
    }

    #[test]
    fn test_tensor2d_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(Tensor2D::<CpuBackend>::from_rows(&rows).is_none());
    }
}
