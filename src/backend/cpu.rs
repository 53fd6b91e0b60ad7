use super::Backend;

/// Pure-Rust CPU backend over `Vec<f64>` storage.
#[derive(Clone, Debug, Copy)]
pub struct CpuBackend;

/// Row-major matrix: `(data, rows, cols)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuTensor2D(pub Vec<f64>, pub usize, pub usize);

impl CpuTensor2D {
    /// # Panics
    /// If `data.len() != rows * cols`.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols, "Inconsistent shape");
        Self(data, rows, cols)
    }

    fn map(&self, f: impl Fn(usize, f64) -> f64) -> Self {
        let cols = self.2.max(1);
        let data = self
            .0
            .iter()
            .enumerate()
            .map(|(i, &x)| f(i % cols, x))
            .collect();
        Self(data, self.1, self.2)
    }
}

fn zip_with(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    assert_eq!(a.len(), b.len(), "Length mismatch");
    a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()
}

impl Backend for CpuBackend {
    type Scalar = f64;
    type Tensor1D = Vec<f64>;
    type Tensor2D = CpuTensor2D;

    fn zeros_1d(len: usize) -> Self::Tensor1D {
        vec![0.; len]
    }

    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D {
        CpuTensor2D::new(vec![0.; rows * cols], rows, cols)
    }

    fn from_vec_1d(data: Vec<f64>) -> Self::Tensor1D {
        data
    }

    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D {
        CpuTensor2D::new(data, rows, cols)
    }

    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        zip_with(a, b, |x, y| x + y)
    }

    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        zip_with(a, b, |x, y| x - y)
    }

    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        zip_with(a, b, |x, y| x * y)
    }

    fn mul_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t.iter().map(|x| x * s).collect()
    }

    fn add_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t.iter().map(|x| x + s).collect()
    }

    fn abs_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.iter().map(|x| x.abs()).collect()
    }

    fn sign_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.iter()
            .map(|&x| {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn sum_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        t.iter().sum()
    }

    fn mean_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        if t.is_empty() {
            return 0.0;
        }
        t.iter().sum::<f64>() / t.len() as f64
    }

    fn scalar_f64(value: f64) -> Self::Scalar {
        value
    }

    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64> {
        t.clone()
    }

    fn to_vec_2d(t: &Self::Tensor2D) -> Vec<f64> {
        t.0.clone()
    }

    fn len_1d(t: &Self::Tensor1D) -> usize {
        t.len()
    }

    fn shape(t: &Self::Tensor2D) -> (usize, usize) {
        (t.1, t.2)
    }

    fn matvec(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        let CpuTensor2D(data, rows, cols) = a;
        assert_eq!(*cols, x.len(), "matvec: A.cols() != x.len()");
        if *cols == 0 {
            return vec![0.0; *rows];
        }
        data.chunks(*cols)
            .map(|row| row.iter().zip(x).map(|(a, b)| a * b).sum())
            .collect()
    }

    fn matvec_transposed(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        let CpuTensor2D(data, rows, cols) = a;
        assert_eq!(*rows, x.len(), "matvec_transposed: A.rows() != x.len()");
        let mut out = vec![0.0; *cols];
        if *cols == 0 {
            return out;
        }
        for (row, &xi) in data.chunks(*cols).zip(x) {
            for (o, &aij) in out.iter_mut().zip(row) {
                *o += aij * xi;
            }
        }
        out
    }

    fn col_mean_2d(t: &Self::Tensor2D) -> Self::Tensor1D {
        let rows = t.1;
        if rows == 0 {
            return vec![0.0; t.2];
        }
        let ones = vec![1.0; rows];
        Self::matvec_transposed(t, &ones)
            .into_iter()
            .map(|s| s / rows as f64)
            .collect()
    }

    fn col_std_2d(t: &Self::Tensor2D, ddof: usize) -> Self::Tensor1D {
        let CpuTensor2D(data, rows, cols) = t;
        if *rows <= ddof || *cols == 0 {
            return vec![0.0; *cols];
        }
        let means = Self::col_mean_2d(t);
        let mut var = vec![0.0; *cols];
        for row in data.chunks(*cols) {
            for ((v, &x), &m) in var.iter_mut().zip(row).zip(&means) {
                *v += (x - m) * (x - m);
            }
        }
        let divisor = (*rows - ddof) as f64;
        var.into_iter().map(|v| (v / divisor).sqrt()).collect()
    }

    fn broadcast_sub_1d_to_2d_rows(t: &Self::Tensor2D, v: &Self::Tensor1D) -> Self::Tensor2D {
        assert_eq!(t.2, v.len(), "broadcast: column count mismatch");
        t.map(|j, x| x - v[j])
    }

    fn broadcast_div_1d_to_2d_rows(t: &Self::Tensor2D, v: &Self::Tensor1D) -> Self::Tensor2D {
        assert_eq!(t.2, v.len(), "broadcast: column count mismatch");
        t.map(|j, x| x / v[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matvec_transpose() {
        // X = [[1, 2],
        //      [3, 4],
        //      [5, 6]]
        // Xᵀ @ [1, 0, 2] = [11, 14]
        let x = CpuTensor2D::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        let v = vec![1.0, 0.0, 2.0];

        assert_eq!(CpuBackend::matvec_transposed(&x, &v), vec![11.0, 14.0]);
    }

    #[test]
    fn test_matvec() {
        let x = CpuTensor2D::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        assert_eq!(CpuBackend::matvec(&x, &vec![1.0, 1.0]), vec![3.0, 7.0, 11.0]);
    }

    #[test]
    #[should_panic(expected = "matvec")]
    fn test_matvec_shape_mismatch_panics() {
        let x = CpuTensor2D::new(vec![1.0, 2.0], 1, 2);
        CpuBackend::matvec(&x, &vec![1.0]);
    }

    #[test]
    fn test_col_std_population_and_sample() {
        let t = CpuTensor2D::new(vec![2.0, 4.0, 4.0, 4.0, 6.0, 4.0], 3, 2);
        let pop = CpuBackend::col_std_2d(&t, 0);
        let sample = CpuBackend::col_std_2d(&t, 1);

        assert!((pop[0] - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((sample[0] - 2.0).abs() < 1e-12);
        assert_eq!(pop[1], 0.0);
    }

    #[test]
    fn test_broadcast_standardises_rows() {
        let t = CpuTensor2D::new(vec![10.0, 20.0, 30.0, 40.0], 2, 2);
        let mean = vec![20.0, 30.0];
        let std = vec![10.0, 10.0];

        let z = CpuBackend::broadcast_div_1d_to_2d_rows(
            &CpuBackend::broadcast_sub_1d_to_2d_rows(&t, &mean),
            &std,
        );
        assert_eq!(z.0, vec![-1.0, -1.0, 1.0, 1.0]);
        assert_eq!((z.1, z.2), (2, 2));
    }
}
