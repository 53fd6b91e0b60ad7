//! # Backend Abstraction
//!
//! Models, losses and preprocessing are written against the [`Backend`] trait
//! so the numeric kernels can be swapped without touching model code.
//!
//! Only the operations the range pipeline actually needs are part of the
//! trait: element-wise 1D arithmetic, matrix-vector products, column
//! statistics and row broadcasting for scaling.
//!
//! ## Available Backends
//!
//! | Backend          | Feature   | Use Case                          |
//! |------------------|-----------|-----------------------------------|
//! | `CpuBackend`     | `cpu`     | Default, pure-Rust implementation |
//! | `NdarrayBackend` | `ndarray` | Interop with `ndarray` ecosystem  |
//!
//! ## Example
//!
//! ```rust
//! use ev_range::backend::{CpuBackend, Tensor1D, Tensor2D};
//!
//! let x: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, 2.0]);
//! let w: Tensor2D<CpuBackend> = Tensor2D::new(vec![0.5, 0.5, 0.5, 0.5], 2, 2);
//! let y = w.dot(&x);
//! assert_eq!(y.to_vec(), vec![1.5, 1.5]);
//! ```

#[cfg(feature = "cpu")]
pub mod cpu;
#[cfg(feature = "cpu")]
pub use cpu::{CpuBackend, CpuTensor2D};

#[cfg(feature = "ndarray")]
mod ndarray_backend;
#[cfg(feature = "ndarray")]
pub use ndarray_backend::{NdarrayBackend, NdarrayTensor2D};

pub mod scalar;
pub mod tensor1d;
pub mod tensor2d;

pub use scalar::{Scalar, ScalarOps};
pub use tensor1d::Tensor1D;
pub use tensor2d::Tensor2D;

/// Tensor storage plus the handful of kernels the range pipeline runs.
///
/// 2D tensors are row-major. Kernels panic on shape mismatch; data coming
/// from outside the crate is shape-checked before it gets here.
pub trait Backend: Clone + Copy + Send + Sync + 'static {
    type Scalar: ScalarOps;
    type Tensor1D: Clone + Send + Sync;
    type Tensor2D: Clone + Send + Sync;

    fn zeros_1d(len: usize) -> Self::Tensor1D;
    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D;
    fn from_vec_1d(data: Vec<f64>) -> Self::Tensor1D;
    /// Panics unless `data.len() == rows * cols`.
    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D;

    // element-wise, 1D
    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;
    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;
    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;
    fn mul_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D;
    fn add_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D;
    fn abs_1d(t: &Self::Tensor1D) -> Self::Tensor1D;
    /// -1, 0 or 1 per element; feeds the MAE gradient.
    fn sign_1d(t: &Self::Tensor1D) -> Self::Tensor1D;

    fn sum_all_1d(t: &Self::Tensor1D) -> Self::Scalar;
    /// Zero for an empty tensor.
    fn mean_all_1d(t: &Self::Tensor1D) -> Self::Scalar;

    fn scalar_f64(value: f64) -> Self::Scalar;
    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64>;
    /// Row-major copy.
    fn to_vec_2d(t: &Self::Tensor2D) -> Vec<f64>;
    fn len_1d(t: &Self::Tensor1D) -> usize;
    /// `(rows, cols)`
    fn shape(t: &Self::Tensor2D) -> (usize, usize);

    /// Predictions for a design matrix: `a` is `(m, n)`, `x` has length `n`.
    fn matvec(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D;
    /// Gradient accumulation: `aᵀ x` with `x` of length `m`.
    fn matvec_transposed(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D;

    // per-column statistics for the scaler
    fn col_mean_2d(t: &Self::Tensor2D) -> Self::Tensor1D;
    fn col_std_2d(t: &Self::Tensor2D, ddof: usize) -> Self::Tensor1D;

    /// `t[i, j] - v[j]`
    fn broadcast_sub_1d_to_2d_rows(t: &Self::Tensor2D, v: &Self::Tensor1D) -> Self::Tensor2D;
    /// `t[i, j] / v[j]`
    fn broadcast_div_1d_to_2d_rows(t: &Self::Tensor2D, v: &Self::Tensor1D) -> Self::Tensor2D;
}
