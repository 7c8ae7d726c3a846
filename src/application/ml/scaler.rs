use crate::domain::errors::{FortunaError, FortunaResult};
use serde::{Deserialize, Serialize};

/// Per-feature standardization to zero mean and unit variance.
/// Features with zero variance keep a scale of 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[Vec<f64>]) -> FortunaResult<Self> {
        let Some(first) = rows.first() else {
            return Err(FortunaError::TrainingError {
                reason: "cannot fit scaler on zero rows".to_string(),
            });
        };
        let width = first.len();
        if rows.iter().any(|r| r.len() != width) {
            return Err(FortunaError::TrainingError {
                reason: "feature rows have differing widths".to_string(),
            });
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; width];
        for row in rows {
            for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }
        let scale = var
            .into_iter()
            .map(|v| {
                let sd = (v / n).sqrt();
                if sd < 1e-12 { 1.0 } else { sd }
            })
            .collect();

        Ok(Self { mean, scale })
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, row: &[f64]) -> FortunaResult<Vec<f64>> {
        if row.len() != self.width() {
            return Err(FortunaError::PredictionError {
                reason: format!(
                    "scaler expects {} features, got {}",
                    self.width(),
                    row.len()
                ),
            });
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    pub fn transform_rows(&self, rows: &[Vec<f64>]) -> FortunaResult<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}
