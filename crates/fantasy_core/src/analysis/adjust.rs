use super::percentiles::PercentileSet;
use crate::error::{Result, SimError};

/// Rescale a percentile set after a projection change.
///
/// Every percentile is multiplied by `adjusted / projection * factor`; the
/// 25th and 50th are floored at zero. Equal projections return the set
/// unchanged.
pub fn adjust_percentiles(
    set: &PercentileSet,
    projection: f64,
    adjusted_projection: f64,
    factor: f64,
) -> Result<PercentileSet> {
    if !(projection > 0.0 && projection.is_finite()) {
        return Err(SimError::invalid(format!("projection must be > 0, got {projection}")));
    }
    if !adjusted_projection.is_finite() || !factor.is_finite() {
        return Err(SimError::invalid("adjusted projection and factor must be finite"));
    }
    if projection == adjusted_projection {
        return Ok(*set);
    }

    let shift = adjusted_projection / projection * factor;
    Ok(PercentileSet {
        p25: (set.p25 * shift).max(0.0),
        p50: (set.p50 * shift).max(0.0),
        p75: set.p75 * shift,
        p85: set.p85 * shift,
        p95: set.p95 * shift,
        p99: set.p99 * shift,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> PercentileSet {
        PercentileSet { p25: 8.0, p50: 12.0, p75: 16.0, p85: 19.0, p95: 24.0, p99: 30.0 }
    }

    #[test]
    fn test_scales_by_projection_ratio() {
        let adjusted = adjust_percentiles(&set(), 12.0, 15.0, 1.0).unwrap();
        assert!((adjusted.p50 - 15.0).abs() < 1e-12);
        assert!((adjusted.p99 - 37.5).abs() < 1e-12);
    }

    #[test]
    fn test_unchanged_projection_is_identity() {
        assert_eq!(adjust_percentiles(&set(), 12.0, 12.0, 3.0).unwrap(), set());
    }

    #[test]
    fn test_lower_percentiles_floor_at_zero() {
        let adjusted = adjust_percentiles(&set(), 12.0, -6.0, 1.0).unwrap();
        assert_eq!(adjusted.p25, 0.0);
        assert_eq!(adjusted.p50, 0.0);
        assert!(adjusted.p99 < 0.0);
    }

    #[test]
    fn test_rejects_zero_projection() {
        assert!(matches!(
            adjust_percentiles(&set(), 0.0, 5.0, 1.0),
            Err(SimError::InvalidParameter(_))
        ));
    }
}
