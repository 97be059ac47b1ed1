//! Numeric column scaling with explicitly captured fit parameters.

use serde::{Deserialize, Serialize};

/// Scaling strategy for a numeric column. Min-max and z-score are mutually
/// exclusive per column; the configuration layer rejects overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    MinMax,
    ZScore,
}

/// Fitted parameters for one scaled column, returned to the caller so the
/// same transform can be re-applied to new data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ScalerParams {
    MinMax { min: f64, max: f64 },
    ZScore { mean: f64, std_dev: f64 },
}

impl ScalerParams {
    /// Fit over a column's values.
    pub fn fit(kind: ScalerKind, values: &[f64]) -> Self {
        match kind {
            ScalerKind::MinMax => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                if values.is_empty() {
                    Self::MinMax { min: 0.0, max: 0.0 }
                } else {
                    Self::MinMax { min, max }
                }
            }
            ScalerKind::ZScore => {
                if values.is_empty() {
                    return Self::ZScore {
                        mean: 0.0,
                        std_dev: 0.0,
                    };
                }
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                let variance =
                    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
                Self::ZScore {
                    mean,
                    std_dev: variance.sqrt(),
                }
            }
        }
    }

    /// Apply the fitted transform to one value. Degenerate fits (constant
    /// column) map to 0.0 instead of dividing by zero.
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Self::MinMax { min, max } => {
                let range = max - min;
                if range == 0.0 {
                    0.0
                } else {
                    (value - min) / range
                }
            }
            Self::ZScore { mean, std_dev } => {
                if std_dev == 0.0 {
                    0.0
                } else {
                    (value - mean) / std_dev
                }
            }
        }
    }
}
