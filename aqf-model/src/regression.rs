//! Polynomial least squares regression.
//!
//! Each input column is expanded with its own powers up to the model
//! degree (no cross-column products), so a degree-2 model over `d` inputs
//! has `1 + 2d` coefficients. Expanded columns are standardized before the
//! solve and the system is solved through an SVD, which returns the
//! minimum-norm solution when the design is rank deficient (constant
//! columns, duplicated flags, fewer rows than coefficients).

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::error::RegressionError;

/// Degree used by the trainer.
pub const DEFAULT_DEGREE: usize = 2;

/// Relative cutoff below which singular values are treated as zero.
const SINGULAR_VALUE_CUTOFF: f64 = 1e-10;

/// A model that can be fit on rows of inputs and asked for point predictions.
pub trait Regressor: Sized {
    /// Fit on `rows` (all of equal width) against `targets`.
    fn fit<R: AsRef<[f64]>>(rows: &[R], targets: &[f64]) -> Result<Self, RegressionError>;

    /// Predict a single value.
    fn predict(&self, input: &[f64]) -> Result<f64, RegressionError>;
}

/// Fitted per-column polynomial model.
#[derive(Debug, Clone, Serialize)]
pub struct PolynomialRegression {
    degree: usize,
    n_inputs: usize,
    /// Mean of each expanded column (intercept excluded)
    means: Vec<f64>,
    /// Standard deviation of each expanded column, 1.0 for constant columns
    scales: Vec<f64>,
    /// Intercept followed by one coefficient per expanded column
    coefficients: Vec<f64>,
}

impl PolynomialRegression {
    pub fn fit_with_degree<R: AsRef<[f64]>>(
        rows: &[R],
        targets: &[f64],
        degree: usize,
    ) -> Result<Self, RegressionError> {
        if rows.is_empty() {
            return Err(RegressionError::NoSamples);
        }
        if rows.len() != targets.len() {
            return Err(RegressionError::DimensionMismatch {
                expected: rows.len(),
                found: targets.len(),
            });
        }
        let degree = degree.max(1);
        let n_inputs = rows[0].as_ref().len();
        let n_expanded = n_inputs * degree;
        let n_rows = rows.len();

        let mut expanded = Vec::with_capacity(n_rows * n_expanded);
        for row in rows {
            let row = row.as_ref();
            if row.len() != n_inputs {
                return Err(RegressionError::DimensionMismatch {
                    expected: n_inputs,
                    found: row.len(),
                });
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(RegressionError::NonFiniteInput);
            }
            expanded.extend(expand(row, degree));
        }
        if targets.iter().any(|v| !v.is_finite()) {
            return Err(RegressionError::NonFiniteInput);
        }

        let mut means = vec![0.0; n_expanded];
        for r in 0..n_rows {
            for c in 0..n_expanded {
                means[c] += expanded[r * n_expanded + c];
            }
        }
        for m in means.iter_mut() {
            *m /= n_rows as f64;
        }
        let mut scales = vec![0.0; n_expanded];
        for r in 0..n_rows {
            for c in 0..n_expanded {
                let d = expanded[r * n_expanded + c] - means[c];
                scales[c] += d * d;
            }
        }
        for s in scales.iter_mut() {
            let sd = (*s / n_rows as f64).sqrt();
            *s = if sd > f64::EPSILON { sd } else { 1.0 };
        }

        // design matrix: intercept column then standardized expanded columns
        let n_cols = n_expanded + 1;
        let mut design = DMatrix::<f64>::zeros(n_rows, n_cols);
        for r in 0..n_rows {
            design[(r, 0)] = 1.0;
            for c in 0..n_expanded {
                design[(r, c + 1)] = (expanded[r * n_expanded + c] - means[c]) / scales[c];
            }
        }
        let y = DVector::from_column_slice(targets);

        let svd = design
            .try_svd(true, true, f64::EPSILON, 0)
            .ok_or_else(|| RegressionError::SolveFailed("SVD did not converge".to_string()))?;
        let cutoff = svd.singular_values.max() * SINGULAR_VALUE_CUTOFF;
        let solution = svd
            .solve(&y, cutoff)
            .map_err(|e| RegressionError::SolveFailed(e.to_string()))?;
        if solution.iter().any(|v| !v.is_finite()) {
            return Err(RegressionError::SolveFailed(
                "non-finite coefficients".to_string(),
            ));
        }

        Ok(PolynomialRegression {
            degree,
            n_inputs,
            means,
            scales,
            coefficients: solution.iter().copied().collect(),
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }
}

impl Regressor for PolynomialRegression {
    fn fit<R: AsRef<[f64]>>(rows: &[R], targets: &[f64]) -> Result<Self, RegressionError> {
        Self::fit_with_degree(rows, targets, DEFAULT_DEGREE)
    }

    fn predict(&self, input: &[f64]) -> Result<f64, RegressionError> {
        if input.len() != self.n_inputs {
            return Err(RegressionError::DimensionMismatch {
                expected: self.n_inputs,
                found: input.len(),
            });
        }
        let mut value = self.coefficients[0];
        for (c, x) in expand(input, self.degree).enumerate() {
            value += self.coefficients[c + 1] * (x - self.means[c]) / self.scales[c];
        }
        if value.is_finite() {
            Ok(value)
        } else {
            Err(RegressionError::NonFinitePrediction)
        }
    }
}

/// `[x1, .., xd, x1^2, .., xd^2, ..]` up to `degree`.
fn expand(row: &[f64], degree: usize) -> impl Iterator<Item = f64> + '_ {
    (1..=degree).flat_map(move |p| row.iter().map(move |x| x.powi(p as i32)))
}
