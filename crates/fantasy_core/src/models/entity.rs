use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::{Result, SimError};

/// Position that anchors a group's correlation when no explicit driver flag is given.
pub const DRIVER_POSITION: &str = "QB";

/// One roster row as handed over by the projection loader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityRecord {
    pub id: String,
    pub group_id: String,
    #[serde(default)]
    pub position: Option<String>,
    pub base_projection: f64,
    /// Standard deviation; derived from the position ratio when absent
    #[serde(default)]
    pub dispersion: Option<f64>,
    #[serde(default)]
    pub usage_share: Option<f64>,
    #[serde(default)]
    pub is_driver: Option<bool>,
    /// Multiplier on the final outcome (1.0 when absent)
    #[serde(default)]
    pub team_share: Option<f64>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, group_id: impl Into<String>, base_projection: f64) -> Self {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            position: None,
            base_projection,
            dispersion: None,
            usage_share: None,
            is_driver: None,
            team_share: None,
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_dispersion(mut self, dispersion: f64) -> Self {
        self.dispersion = Some(dispersion);
        self
    }

    pub fn with_usage_share(mut self, share: f64) -> Self {
        self.usage_share = Some(share);
        self
    }

    pub fn with_driver(mut self, is_driver: bool) -> Self {
        self.is_driver = Some(is_driver);
        self
    }

    pub fn with_team_share(mut self, share: f64) -> Self {
        self.team_share = Some(share);
        self
    }
}

/// A validated entity with every optional field resolved against the config.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Entity {
    pub id: String,
    pub group_id: String,
    pub position: Option<String>,
    pub base_projection: f64,
    pub dispersion: f64,
    pub usage_share: f64,
    pub team_share: f64,
    pub is_driver: bool,
}

impl Entity {
    pub fn from_record(record: EntityRecord, config: &SimConfig) -> Result<Self> {
        if record.id.trim().is_empty() {
            return Err(SimError::invalid("entity id must not be empty"));
        }
        if !(record.base_projection >= 0.0 && record.base_projection.is_finite()) {
            return Err(SimError::invalid(format!(
                "base_projection for '{}' must be a non-negative number, got {}",
                record.id, record.base_projection
            )));
        }

        let position = record.position.as_deref();
        let dispersion = match record.dispersion {
            Some(d) => d,
            None => record.base_projection * config.std_dev_ratio_for(position),
        };
        if !(dispersion >= 0.0 && dispersion.is_finite()) {
            return Err(SimError::invalid(format!(
                "dispersion for '{}' must be >= 0, got {}",
                record.id, dispersion
            )));
        }

        let usage_share = record.usage_share.unwrap_or_else(|| config.usage_share_for(position));
        if !(0.0..=1.0).contains(&usage_share) {
            return Err(SimError::invalid(format!(
                "usage_share for '{}' must be within [0, 1], got {}",
                record.id, usage_share
            )));
        }

        let team_share = record.team_share.unwrap_or(1.0);
        if !(team_share >= 0.0 && team_share.is_finite()) {
            return Err(SimError::invalid(format!(
                "team_share for '{}' must be >= 0, got {}",
                record.id, team_share
            )));
        }

        let is_driver = record
            .is_driver
            .unwrap_or_else(|| position.is_some_and(|p| p.eq_ignore_ascii_case(DRIVER_POSITION)));

        Ok(Self {
            id: record.id,
            group_id: record.group_id,
            position: record.position,
            base_projection: record.base_projection,
            dispersion,
            usage_share,
            team_share,
            is_driver,
        })
    }

    pub fn is_at(&self, position: &str) -> bool {
        self.position.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispersion_from_position_ratio() {
        let config = SimConfig::default();
        let entity =
            Entity::from_record(EntityRecord::new("wr", "A", 18.0).with_position("WR1"), &config)
                .unwrap();
        assert!((entity.dispersion - 7.2).abs() < 1e-12);
        assert_eq!(entity.usage_share, 0.35);
        assert_eq!(entity.team_share, 1.0);
        assert!(!entity.is_driver);
    }

    #[test]
    fn test_qb_is_driver_by_default() {
        let config = SimConfig::default();
        let qb = Entity::from_record(EntityRecord::new("qb", "A", 20.0).with_position("qb"), &config)
            .unwrap();
        assert!(qb.is_driver);

        let benched =
            Entity::from_record(EntityRecord::new("qb2", "A", 5.0).with_position("QB").with_driver(false), &config)
                .unwrap();
        assert!(!benched.is_driver);
    }

    #[test]
    fn test_unknown_position_uses_defaults() {
        let config = SimConfig::default();
        let k = Entity::from_record(EntityRecord::new("k", "A", 10.0).with_position("K"), &config)
            .unwrap();
        assert!((k.dispersion - 3.0).abs() < 1e-12);
        assert_eq!(k.usage_share, 0.2);
    }

    #[test]
    fn test_rejects_negative_dispersion() {
        let config = SimConfig::default();
        let err = Entity::from_record(EntityRecord::new("x", "A", 10.0).with_dispersion(-1.0), &config)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter(_)));
    }

    #[test]
    fn test_zero_dispersion_is_allowed() {
        let config = SimConfig::default();
        let entity =
            Entity::from_record(EntityRecord::new("x", "A", 10.0).with_dispersion(0.0), &config)
                .unwrap();
        assert_eq!(entity.dispersion, 0.0);
    }
}
