//! # Simulation Configuration
//!
//! `SimConfig` drives the correlated slate simulator, `TennisConfig` the
//! match batch runner. Both deserialize with every field defaulted, so a
//! config file only needs the values it overrides.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = SimConfig::load("configs/main_slate.yaml")?;
//! let runner = SimulationRunner::new(config)?;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::{env, fs};

use crate::error::{Result, SimError};

pub const SIM_CONFIG_PATH_ENV: &str = "FANTASY_SIM_CONFIG_PATH";

// ========== Slate Simulation Config ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Trials per run
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,

    /// Fixed seed for reproducible runs; `None` draws one from entropy
    #[serde(default)]
    pub seed: Option<u64>,

    /// Coefficient of variation of log-normal team totals
    #[serde(default = "default_team_variability")]
    pub team_variability: f64,

    /// Multiplier applied to the driver's shock before it reaches teammates
    #[serde(default = "default_correlation_factor")]
    pub correlation_factor: f64,

    /// Usage share for positions missing from `usage_shares`
    #[serde(default = "default_usage_share")]
    pub default_usage_share: f64,

    #[serde(default = "default_usage_shares")]
    pub usage_shares: HashMap<String, f64>,

    /// Std-dev as a fraction of base projection, used when a record has no dispersion
    #[serde(default = "default_std_dev_ratios")]
    pub std_dev_ratios: HashMap<String, f64>,

    #[serde(default = "default_std_dev_ratio")]
    pub default_std_dev_ratio: f64,

    /// Lower clamp for player outcomes; `None` disables clamping
    #[serde(default = "default_outcome_floor")]
    pub outcome_floor: Option<f64>,

    /// Positions whose direction is compared against the driver's shock
    #[serde(default = "default_alignment_positions")]
    pub alignment_positions: Vec<String>,

    #[serde(default)]
    pub parallel: bool,

    /// Trials per worker shard when `parallel` is set
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_num_simulations() -> usize {
    10_000
}
fn default_team_variability() -> f64 {
    0.15
}
fn default_correlation_factor() -> f64 {
    2.0
}
fn default_usage_share() -> f64 {
    0.2
}
fn default_std_dev_ratio() -> f64 {
    0.3
}
fn default_outcome_floor() -> Option<f64> {
    Some(0.0)
}
fn default_chunk_size() -> usize {
    1_000
}

fn default_usage_shares() -> HashMap<String, f64> {
    [("WR1", 0.35), ("WR2", 0.25), ("WR3", 0.15), ("TE", 0.15), ("RB", 0.2)]
        .into_iter()
        .map(|(pos, share)| (pos.to_string(), share))
        .collect()
}

fn default_std_dev_ratios() -> HashMap<String, f64> {
    [
        ("QB", 0.30),
        ("RB", 0.40),
        ("WR1", 0.40),
        ("WR2", 0.35),
        ("WR3", 0.30),
        ("TE", 0.35),
        ("DST", 0.25),
    ]
    .into_iter()
    .map(|(pos, ratio)| (pos.to_string(), ratio))
    .collect()
}

fn default_alignment_positions() -> Vec<String> {
    ["WR1", "WR2", "WR3", "TE", "RB"].iter().map(|p| p.to_string()).collect()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_simulations: default_num_simulations(),
            seed: None,
            team_variability: default_team_variability(),
            correlation_factor: default_correlation_factor(),
            default_usage_share: default_usage_share(),
            usage_shares: default_usage_shares(),
            std_dev_ratios: default_std_dev_ratios(),
            default_std_dev_ratio: default_std_dev_ratio(),
            outcome_floor: default_outcome_floor(),
            alignment_positions: default_alignment_positions(),
            parallel: false,
            chunk_size: default_chunk_size(),
        }
    }
}

impl SimConfig {
    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("failed to read {}: {e}", path.display())))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig =
            serde_json::from_str(json).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: SimConfig =
            serde_yaml::from_str(yaml).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `FANTASY_SIM_CONFIG_PATH`, or defaults when unset.
    pub fn from_env() -> Result<Self> {
        let Ok(path) = env::var(SIM_CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        Self::load(path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_simulations == 0 {
            return Err(SimError::invalid("num_simulations must be positive"));
        }
        if !(self.team_variability > 0.0 && self.team_variability.is_finite()) {
            return Err(SimError::invalid(format!(
                "team_variability must be > 0, got {}",
                self.team_variability
            )));
        }
        if !(self.correlation_factor >= 0.0 && self.correlation_factor.is_finite()) {
            return Err(SimError::invalid(format!(
                "correlation_factor must be >= 0, got {}",
                self.correlation_factor
            )));
        }
        check_unit("default_usage_share", self.default_usage_share)?;
        for (position, share) in &self.usage_shares {
            check_unit(&format!("usage_shares.{position}"), *share)?;
        }
        if !(self.default_std_dev_ratio >= 0.0 && self.default_std_dev_ratio.is_finite()) {
            return Err(SimError::invalid(format!(
                "default_std_dev_ratio must be >= 0, got {}",
                self.default_std_dev_ratio
            )));
        }
        for (position, ratio) in &self.std_dev_ratios {
            if !(*ratio >= 0.0 && ratio.is_finite()) {
                return Err(SimError::invalid(format!(
                    "std_dev_ratios.{position} must be >= 0, got {ratio}"
                )));
            }
        }
        if let Some(floor) = self.outcome_floor {
            if !floor.is_finite() {
                return Err(SimError::invalid("outcome_floor must be finite"));
            }
        }
        if self.chunk_size == 0 {
            return Err(SimError::invalid("chunk_size must be positive"));
        }
        Ok(())
    }

    pub fn usage_share_for(&self, position: Option<&str>) -> f64 {
        position
            .and_then(|pos| self.usage_shares.get(pos).copied())
            .unwrap_or(self.default_usage_share)
    }

    pub fn std_dev_ratio_for(&self, position: Option<&str>) -> f64 {
        position
            .and_then(|pos| self.std_dev_ratios.get(pos).copied())
            .unwrap_or(self.default_std_dev_ratio)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::invalid(format!("{name} must be within [0, 1], got {value}")))
    }
}

// ========== Tennis Batch Config ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TennisConfig {
    #[serde(default = "default_best_of")]
    pub best_of: u8,

    #[serde(default = "default_num_matches")]
    pub num_matches: usize,

    /// Serves sampled per game for ace / double-fault counts
    #[serde(default = "default_serves_per_game")]
    pub serves_per_game: u64,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub parallel: bool,
}

fn default_best_of() -> u8 {
    3
}
fn default_num_matches() -> usize {
    1_000
}
fn default_serves_per_game() -> u64 {
    8
}

impl Default for TennisConfig {
    fn default() -> Self {
        Self {
            best_of: default_best_of(),
            num_matches: default_num_matches(),
            serves_per_game: default_serves_per_game(),
            seed: None,
            parallel: false,
        }
    }
}

impl TennisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.best_of != 3 && self.best_of != 5 {
            return Err(SimError::invalid(format!("best_of must be 3 or 5, got {}", self.best_of)));
        }
        if self.num_matches == 0 {
            return Err(SimError::invalid("num_matches must be positive"));
        }
        if self.serves_per_game == 0 {
            return Err(SimError::invalid("serves_per_game must be positive"));
        }
        Ok(())
    }
}
