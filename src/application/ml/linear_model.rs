//! Ordinary least squares with an intercept.
//!
//! The intercept is handled by centering X and y, then the normal equations
//! `(Xc'Xc) β = Xc'yc` are solved with a Cholesky factorisation.
//! Constant columns are excluded from the solve and receive a zero
//! coefficient, which is the minimum-norm least-squares answer for a column
//! that is collinear with the intercept. Callers that transform X before
//! fitting decide the constant columns on the untransformed matrix with
//! [`varying_columns`] and pass them to [`LinearModel::fit_columns`].

use crate::domain::errors::PredictionError;
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Minimum number of rows for a meaningful fit
pub const MIN_TRAINING_ROWS: usize = 2;

/// Relative tolerance below which a column counts as constant
const CONSTANT_COLUMN_TOLERANCE: f64 = 1e-12;

/// Relative pivot tolerance for the Cholesky factorisation
const SINGULAR_PIVOT_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    coefficients: Array1<f64>,
    r_squared: Option<f64>,
}

impl LinearModel {
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self, PredictionError> {
        Self::fit_columns(x, y, &varying_columns(x))
    }

    /// Fits on the columns listed in `varying`; every other column gets coefficient 0.
    pub fn fit_columns(
        x: &Array2<f64>,
        y: &Array1<f64>,
        varying: &[usize],
    ) -> Result<Self, PredictionError> {
        let (n_rows, n_features) = x.dim();

        if n_rows != y.len() {
            return Err(PredictionError::DegenerateFit {
                reason: format!("{} feature rows but {} targets", n_rows, y.len()),
            });
        }

        if n_rows < MIN_TRAINING_ROWS {
            return Err(PredictionError::InsufficientData {
                rows: n_rows,
                required: MIN_TRAINING_ROWS,
            });
        }

        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(PredictionError::DegenerateFit {
                reason: "design matrix contains non-finite values".to_string(),
            });
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PredictionError::InsufficientData {
                rows: 0,
                required: MIN_TRAINING_ROWS,
            })?;
        let y_mean = y.mean().ok_or(PredictionError::InsufficientData {
            rows: 0,
            required: MIN_TRAINING_ROWS,
        })?;

        if varying.iter().any(|&j| j >= n_features) {
            return Err(PredictionError::DegenerateFit {
                reason: format!("column index out of range for {} features", n_features),
            });
        }

        if varying.is_empty() {
            return Err(PredictionError::DegenerateFit {
                reason: "every feature column is constant (e.g. identical previous closes)"
                    .to_string(),
            });
        }

        let xc = Array2::from_shape_fn((n_rows, varying.len()), |(i, k)| {
            x[[i, varying[k]]] - x_mean[varying[k]]
        });
        let yc = y.mapv(|v| v - y_mean);

        let gram = xc.t().dot(&xc);
        let xty = xc.t().dot(&yc);

        if gram.iter().chain(xty.iter()).any(|v| !v.is_finite()) {
            return Err(PredictionError::DegenerateFit {
                reason: "numeric overflow: feature values are too large to fit".to_string(),
            });
        }

        let beta = cholesky_solve(&gram, &xty).ok_or_else(|| PredictionError::DegenerateFit {
            reason: "feature columns are collinear; design matrix is singular".to_string(),
        })?;

        let mut coefficients = Array1::<f64>::zeros(n_features);
        for (k, &j) in varying.iter().enumerate() {
            coefficients[j] = beta[k];
        }
        let intercept = y_mean - x_mean.dot(&coefficients);

        let ss_tot: f64 = yc.iter().map(|v| v * v).sum();
        let ss_res: f64 = x
            .rows()
            .into_iter()
            .zip(y.iter())
            .map(|(row, &target)| {
                let residual = target - (intercept + row.dot(&coefficients));
                residual * residual
            })
            .sum();
        let r_squared = (ss_tot > 0.0).then(|| 1.0 - ss_res / ss_tot);

        Ok(Self {
            intercept,
            coefficients,
            r_squared,
        })
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        self.intercept + row.dot(&self.coefficients)
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// In-sample R², `None` when the targets have no variance
    pub fn r_squared(&self) -> Option<f64> {
        self.r_squared
    }
}

/// Indices of the columns that are not constant
pub fn varying_columns(x: &Array2<f64>) -> Vec<usize> {
    (0..x.ncols())
        .filter(|&j| !is_constant(x.column(j)))
        .collect()
}

pub fn is_constant(column: ArrayView1<f64>) -> bool {
    let Some(&first) = column.iter().next() else {
        return true;
    };
    let tolerance = CONSTANT_COLUMN_TOLERANCE * first.abs().max(1.0);
    column.iter().all(|v| (v - first).abs() <= tolerance)
}

/// Solves `A x = b` for symmetric positive-definite `A`.
/// Returns `None` when a pivot collapses, i.e. `A` is (numerically) singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let max_diag = a.diag().iter().cloned().fold(0.0_f64, f64::max);
    if max_diag <= 0.0 {
        return None;
    }
    let pivot_floor = SINGULAR_PIVOT_TOLERANCE * max_diag;

    // A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= pivot_floor {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L * z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T * x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Some(x)
}
