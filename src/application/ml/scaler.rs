use super::linear_model::is_constant;
use ndarray::{Array1, Array2, ArrayView1};
use statrs::statistics::Statistics;

/// Per-column z-score scaling (population standard deviation).
///
/// Columns that the linear model treats as constant keep a scale of 1.0, so
/// they come out as (near) zeros instead of blowing up. The broadcast sentiment
/// column is always in that situation. A standard deviation that overflows also
/// falls back to 1.0 and the fit reports the overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(x: &Array2<f64>) -> Self {
        let mut means = Vec::with_capacity(x.ncols());
        let mut scales = Vec::with_capacity(x.ncols());

        for column in x.columns() {
            let mean = column.iter().mean();
            let std_dev = column.iter().population_std_dev();

            let scale = if std_dev.is_finite() && std_dev > 0.0 && !is_constant(column) {
                std_dev
            } else {
                1.0
            };

            means.push(if mean.is_finite() { mean } else { 0.0 });
            scales.push(scale);
        }

        Self {
            means: Array1::from_vec(means),
            scales: Array1::from_vec(scales),
        }
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        Array2::from_shape_fn(x.dim(), |(i, j)| {
            (x[[i, j]] - self.means[j]) / self.scales[j]
        })
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> Array1<f64> {
        Array1::from_shape_fn(row.len(), |j| (row[j] - self.means[j]) / self.scales[j])
    }

    pub fn scales(&self) -> &Array1<f64> {
        &self.scales
    }
}
