use serde::{Deserialize, Serialize};

/// Percentiles reported for every entity.
pub const REPORTED_PERCENTILES: [f64; 6] = [25.0, 50.0, 75.0, 85.0, 95.0, 99.0];

/// Percentile of an ascending slice by linear interpolation between the
/// order statistics around rank `p/100 * (n-1)`.
///
/// Returns `None` for an empty slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Finite values of `values`, sorted ascending. NaN / infinite entries count as missing.
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    out.sort_by(f64::total_cmp);
    out
}

pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileSet {
    #[serde(rename = "25th")]
    pub p25: f64,
    #[serde(rename = "50th")]
    pub p50: f64,
    #[serde(rename = "75th")]
    pub p75: f64,
    #[serde(rename = "85th")]
    pub p85: f64,
    #[serde(rename = "95th")]
    pub p95: f64,
    #[serde(rename = "99th")]
    pub p99: f64,
}

impl PercentileSet {
    /// `None` when fewer than two non-missing values are available.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        Self::from_sorted(&sorted_finite(values))
    }

    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        if sorted.len() < 2 {
            return None;
        }
        let at = |p: f64| percentile_sorted(sorted, p).unwrap_or(f64::NAN);
        Some(Self {
            p25: at(25.0),
            p50: at(50.0),
            p75: at(75.0),
            p85: at(85.0),
            p95: at(95.0),
            p99: at(99.0),
        })
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.p25, self.p50, self.p75, self.p85, self.p95, self.p99]
    }

    pub fn is_monotonic(&self) -> bool {
        self.as_array().windows(2).all(|w| w[0] <= w[1])
    }
}

/// Mean and percentiles of one outcome column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub mean: f64,
    pub percentiles: PercentileSet,
    pub samples: usize,
}

impl OutcomeSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted_finite(values);
        let percentiles = PercentileSet::from_sorted(&sorted)?;
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self { mean, percentiles, samples: sorted.len() })
    }
}
