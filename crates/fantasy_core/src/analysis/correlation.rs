use serde::{Deserialize, Serialize};

use crate::engine::TrialMatrix;

/// Pearson correlation over the trials where both values are present.
///
/// `None` when fewer than two paired values remain or either side has zero
/// variance.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return None;
    }

    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a <= 0.0 || var_b <= 0.0 {
        return None;
    }
    Some((cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairCorrelation {
    pub entity_a: String,
    pub entity_b: String,
    /// Absent when undefined (missing entity, zero variance, too few trials)
    pub correlation: Option<f64>,
}

/// Symmetric matrix of entity correlations, row-major over `ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub ids: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl CorrelationMatrix {
    pub fn from_matrix(matrix: &TrialMatrix) -> Self {
        let ids: Vec<String> = matrix.entity_ids().to_vec();
        let n = ids.len();
        let mut values = vec![None; n * n];
        for i in 0..n {
            for j in i..n {
                let r = match (matrix.entity_column(i), matrix.entity_column(j)) {
                    (Some(a), Some(b)) => pearson(a, b),
                    _ => None,
                };
                values[i * n + j] = r;
                values[j * n + i] = r;
            }
        }
        Self { ids, values }
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.ids.iter().position(|id| id == a)?;
        let j = self.ids.iter().position(|id| id == b)?;
        self.values[i * self.ids.len() + j]
    }
}
