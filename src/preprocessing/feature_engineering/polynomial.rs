//! Polynomial expansion of the scaled inputs.
//!
//! Degree 2 over `[a, b]` yields `[a, b, a², ab, b²]`: every monomial of
//! degree `1..=d`, lower degrees first. No constant column is produced; the
//! linear model carries its own bias.

use crate::backend::{Backend, Tensor2D};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

const MAX_DEGREE: usize = 4;

#[derive(Clone, Debug)]
pub struct PolynomialFeatures<B: Backend> {
    degree: usize,
    _backend: PhantomData<B>,
}

impl<B: Backend> Default for PolynomialFeatures<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> PolynomialFeatures<B> {
    /// Squares and pairwise products.
    pub fn new() -> Self {
        Self {
            degree: 2,
            _backend: PhantomData,
        }
    }

    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolynomialFeaturesParams {
    pub degree: usize,
    pub n_features_in: usize,
    /// For each output column, the input columns multiplied to produce it.
    pub monomials: Vec<Vec<usize>>,
}

#[derive(Clone, Debug)]
pub struct FittedPolynomialFeatures<B: Backend> {
    params: PolynomialFeaturesParams,
    _backend: PhantomData<B>,
}

impl<B: Backend> FittedPolynomialFeatures<B> {
    pub fn degree(&self) -> usize {
        self.params.degree
    }

    pub fn n_features_out(&self) -> usize {
        self.params.monomials.len()
    }

    /// Output column names such as `a`, `a^2` or `a*b`.
    pub fn feature_names(&self, input_names: &[&str]) -> Vec<String> {
        self.params
            .monomials
            .iter()
            .map(|m| monomial_name(m, input_names))
            .collect()
    }
}

fn monomial_name(monomial: &[usize], input_names: &[&str]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut rest = monomial;
    while let Some(&idx) = rest.first() {
        let power = rest.iter().take_while(|&&c| c == idx).count();
        let name = input_names.get(idx).copied().unwrap_or("?");
        parts.push(match power {
            1 => name.to_string(),
            p => format!("{name}^{p}"),
        });
        rest = &rest[power..];
    }
    parts.join("*")
}

impl<B: Backend> Transformer<B> for PolynomialFeatures<B> {
    type Input = Tensor2D<B>;
    type Output = Tensor2D<B>;
    type Params = PolynomialFeaturesParams;
    type Fitted = FittedPolynomialFeatures<B>;

    fn fit(&self, data: &Tensor2D<B>) -> Result<FittedPolynomialFeatures<B>, PreprocessingError> {
        if data.rows() == 0 {
            return Err(PreprocessingError::EmptyData("no rows to expand".into()));
        }
        if data.cols() == 0 {
            return Err(PreprocessingError::InvalidParameter("no input columns to expand".into()));
        }
        if !(1..=MAX_DEGREE).contains(&self.degree) {
            return Err(PreprocessingError::InvalidParameter(format!(
                "polynomial degree must be in 1..={MAX_DEGREE}, got {}",
                self.degree
            )));
        }

        Ok(FittedPolynomialFeatures {
            params: PolynomialFeaturesParams {
                degree: self.degree,
                n_features_in: data.cols(),
                monomials: monomials(data.cols(), self.degree),
            },
            _backend: PhantomData,
        })
    }
}

impl<B: Backend> FittedTransformer<B> for FittedPolynomialFeatures<B> {
    type Input = Tensor2D<B>;
    type Output = Tensor2D<B>;
    type Params = PolynomialFeaturesParams;

    fn transform(&self, data: &Tensor2D<B>) -> Result<Tensor2D<B>, PreprocessingError> {
        if data.cols() != self.params.n_features_in {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.params.n_features_in,
                got_features: data.cols(),
            });
        }

        let rows = data.to_rows();
        let out: Vec<f64> = rows
            .iter()
            .flat_map(|row| {
                self.params
                    .monomials
                    .iter()
                    .map(move |m| m.iter().map(|&i| row[i]).product::<f64>())
            })
            .collect();
        Ok(Tensor2D::new(out, rows.len(), self.n_features_out()))
    }

    fn extract_params(&self) -> PolynomialFeaturesParams {
        self.params.clone()
    }

    fn from_params(params: PolynomialFeaturesParams) -> Result<Self, PreprocessingError> {
        if !(1..=MAX_DEGREE).contains(&params.degree) || params.n_features_in == 0 {
            return Err(PreprocessingError::InvalidParameter(format!(
                "polynomial degree {} over {} inputs",
                params.degree, params.n_features_in
            )));
        }
        // compare sizes before regenerating, so a forged width cannot blow up
        if monomial_count(params.n_features_in, params.degree) != Some(params.monomials.len())
            || params.monomials != monomials(params.n_features_in, params.degree)
        {
            return Err(PreprocessingError::InvalidParameter(
                "polynomial layout does not match its degree and input width".into(),
            ));
        }
        Ok(Self {
            params,
            _backend: PhantomData,
        })
    }

    fn n_features_in(&self) -> usize {
        self.params.n_features_in
    }
}

/// `sum_{k=1..=degree} C(n + k - 1, k)`, or `None` on overflow.
fn monomial_count(n_features: usize, degree: usize) -> Option<usize> {
    let mut total = 0usize;
    let mut per_degree = 1usize;
    for k in 1..=degree {
        // C(n+k-1, k) = C(n+k-2, k-1) * (n+k-1) / k, exact at every step
        per_degree = per_degree.checked_mul(n_features + k - 1)? / k;
        total = total.checked_add(per_degree)?;
    }
    Some(total)
}

/// Non-decreasing index tuples of every length in `1..=degree`, shortest first.
fn monomials(n_features: usize, degree: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    // tuples of length d-1 extend to length d by appending an index >= their last
    let mut frontier: Vec<Vec<usize>> = vec![Vec::new()];
    for _ in 0..degree {
        frontier = frontier
            .iter()
            .flat_map(|prefix| {
                let start = prefix.last().copied().unwrap_or(0);
                (start..n_features).map(move |i| {
                    let mut next = prefix.clone();
                    next.push(i);
                    next
                })
            })
            .collect();
        out.extend(frontier.iter().cloned());
    }
    out
}
