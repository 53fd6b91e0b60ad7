use super::scalar::Scalar;
use crate::backend::Backend;
use std::marker::PhantomData;

/// Backend-typed 1D tensor.
///
/// All operations delegate to the backend and return new tensors; nothing is
/// mutated in place.
///
/// # Example
/// ```
/// use ev_range::backend::{CpuBackend, Scalar, Tensor1D};
///
/// let x: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, 2.0, 3.0]);
/// let y = x.scale(&Scalar::new(2.0));
/// assert_eq!(y.to_vec(), vec![2.0, 4.0, 6.0]);
/// ```
#[derive(Clone)]
pub struct Tensor1D<B: Backend> {
    pub(crate) data: B::Tensor1D,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> Tensor1D<B> {
    pub fn new(data: Vec<f64>) -> Self {
        Self::from_raw(B::from_vec_1d(data))
    }

    pub fn zeros(len: usize) -> Self {
        Self::from_raw(B::zeros_1d(len))
    }

    pub(crate) fn from_raw(data: B::Tensor1D) -> Self {
        Self {
            data,
            backend: PhantomData,
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        Self::from_raw(B::add_1d(&self.data, &other.data))
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::from_raw(B::sub_1d(&self.data, &other.data))
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self::from_raw(B::mul_1d(&self.data, &other.data))
    }

    pub fn scale(&self, a: &Scalar<B>) -> Self {
        Self::from_raw(B::mul_scalar_1d(&self.data, &a.data))
    }

    pub fn add_scalar(&self, a: &Scalar<B>) -> Self {
        Self::from_raw(B::add_scalar_1d(&self.data, &a.data))
    }

    pub fn abs(&self) -> Self {
        Self::from_raw(B::abs_1d(&self.data))
    }

    pub fn sign(&self) -> Self {
        Self::from_raw(B::sign_1d(&self.data))
    }

    /// Inner product `Σ aᵢ bᵢ`.
    ///
    /// # Panics
    /// If lengths differ.
    pub fn dot(&self, other: &Self) -> Scalar<B> {
        let prod = B::mul_1d(&self.data, &other.data);
        Scalar::from_raw(B::sum_all_1d(&prod))
    }

    pub fn sum(&self) -> Scalar<B> {
        Scalar::from_raw(B::sum_all_1d(&self.data))
    }

    pub fn mean(&self) -> Scalar<B> {
        Scalar::from_raw(B::mean_all_1d(&self.data))
    }

    pub fn len(&self) -> usize {
        B::len_1d(&self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        B::to_vec_1d(&self.data)
    }
}
