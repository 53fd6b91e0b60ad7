use crate::backend::Backend;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Sub};

/// Arithmetic required from a backend's native scalar type.
///
/// # Example
/// ```
/// use ev_range::backend::ScalarOps;
///
/// assert_eq!(4.0f64.sqrt(), 2.0);
/// assert_eq!(<f64 as ScalarOps>::zero(), 0.0);
/// ```
pub trait ScalarOps:
    Clone
    + Copy
    + Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Mul<Output = Self>
    + Sub<Output = Self>
    + Div<Output = Self>
{
    fn sqrt(self) -> Self;
    fn abs(self) -> Self;
    fn zero() -> Self;
    fn one() -> Self;
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl ScalarOps for f64 {
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
    fn abs(self) -> Self {
        f64::abs(self)
    }
    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn from_f64(v: f64) -> Self {
        v
    }
    fn to_f64(self) -> f64 {
        self
    }
}

/// Backend-typed scalar.
///
/// Carries the originating backend in its type so scalars from different
/// backends cannot be mixed.
#[cfg_attr(
    feature = "ndarray",
    doc = r#"
```compile_fail
use ev_range::backend::{CpuBackend, NdarrayBackend, Scalar};

let a: Scalar<CpuBackend> = Scalar::new(1.0);
let b: Scalar<NdarrayBackend> = Scalar::new(2.0);
let _ = a + b;
```
"#
)]
///
/// ```
/// use ev_range::backend::{CpuBackend, Scalar};
///
/// let s: Scalar<CpuBackend> = Scalar::new(2.0);
/// assert_eq!((s * s).to_f64(), 4.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Scalar<B: Backend> {
    pub(crate) data: B::Scalar,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> Scalar<B> {
    /// Creates a scalar from an `f64` host value.
    pub fn new(f: f64) -> Self {
        Self {
            data: B::scalar_f64(f),
            backend: PhantomData,
        }
    }

    pub(crate) fn from_raw(data: B::Scalar) -> Self {
        Self {
            data,
            backend: PhantomData,
        }
    }

    /// Converts back to a host `f64`.
    pub fn to_f64(&self) -> f64 {
        self.data.to_f64()
    }

    pub fn sqrt(&self) -> Self {
        Self::from_raw(self.data.sqrt())
    }

    pub fn abs(&self) -> Self {
        Self::from_raw(self.data.abs())
    }
}

macro_rules! scalar_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<B: Backend> $trait for Scalar<B> {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self::from_raw(self.data $op rhs.data)
            }
        }
    };
}

scalar_binop!(Add, add, +);
scalar_binop!(Sub, sub, -);
scalar_binop!(Mul, mul, *);
scalar_binop!(Div, div, /);
