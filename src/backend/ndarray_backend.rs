use super::Backend;
use ndarray::{Array1, Array2, Axis};

/// Backend over `ndarray` arrays.
///
/// Produces the same numbers as [`CpuBackend`](super::CpuBackend) and exists
/// for callers that already hold their data in `ndarray` form.
#[derive(Clone, Debug, Copy)]
pub struct NdarrayBackend;

/// Wrapper around `Array2<f64>` so the backend can own the trait impls.
#[derive(Debug, Clone)]
pub struct NdarrayTensor2D(pub Array2<f64>);

impl Backend for NdarrayBackend {
    type Scalar = f64;
    type Tensor1D = Array1<f64>;
    type Tensor2D = NdarrayTensor2D;

    fn zeros_1d(len: usize) -> Self::Tensor1D {
        Array1::zeros(len)
    }

    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D {
        NdarrayTensor2D(Array2::zeros((rows, cols)))
    }

    fn from_vec_1d(data: Vec<f64>) -> Self::Tensor1D {
        Array1::from_vec(data)
    }

    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D {
        match Array2::from_shape_vec((rows, cols), data) {
            Ok(a) => NdarrayTensor2D(a),
            Err(e) => panic!("Inconsistent shape: {e}"),
        }
    }

    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a + b
    }

    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a - b
    }

    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a * b
    }

    fn mul_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t * *s
    }

    fn add_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t + *s
    }

    fn abs_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.mapv(f64::abs)
    }

    fn sign_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.mapv(|x| {
            if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                0.0
            }
        })
    }

    fn sum_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        t.sum()
    }

    fn mean_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        t.mean().unwrap_or(0.0)
    }

    fn scalar_f64(value: f64) -> Self::Scalar {
        value
    }

    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64> {
        t.to_vec()
    }

    fn to_vec_2d(t: &Self::Tensor2D) -> Vec<f64> {
        t.0.iter().copied().collect()
    }

    fn len_1d(t: &Self::Tensor1D) -> usize {
        t.len()
    }

    fn shape(t: &Self::Tensor2D) -> (usize, usize) {
        t.0.dim()
    }

    fn matvec(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.0.ncols(), x.len(), "matvec: A.cols() != x.len()");
        a.0.dot(x)
    }

    fn matvec_transposed(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.0.nrows(), x.len(), "matvec_transposed: A.rows() != x.len()");
        a.0.t().dot(x)
    }

    fn col_mean_2d(t: &Self::Tensor2D) -> Self::Tensor1D {
        t.0.mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(t.0.ncols()))
    }

    fn col_std_2d(t: &Self::Tensor2D, ddof: usize) -> Self::Tensor1D {
        if t.0.nrows() <= ddof {
            return Array1::zeros(t.0.ncols());
        }
        t.0.std_axis(Axis(0), ddof as f64)
    }

    fn broadcast_sub_1d_to_2d_rows(t: &Self::Tensor2D, v: &Self::Tensor1D) -> Self::Tensor2D {
        NdarrayTensor2D(&t.0 - v)
    }

    fn broadcast_div_1d_to_2d_rows(t: &Self::Tensor2D, v: &Self::Tensor1D) -> Self::Tensor2D {
        NdarrayTensor2D(&t.0 / v)
    }
}
