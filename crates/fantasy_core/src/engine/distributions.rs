//! # Distribution Generators
//!
//! Single-draw samplers for the three outcome families:
//! - team totals: log-normal with a target mean and coefficient of variation
//! - player points: additive normal, optionally scaled by a team share
//! - serve events: binomial counts over a fixed number of serves
//!
//! All samplers take the caller's RNG so a run stays reproducible from its seed.

use rand::Rng;
use rand_distr::{Binomial, Distribution, LogNormal, Normal};

use crate::error::{Result, SimError};

/// Log-normal parameters whose mean equals `mean` and whose CV equals `cv`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNormalParams {
    pub mu: f64,
    pub sigma: f64,
}

impl LogNormalParams {
    /// `sigma = sqrt(ln(1 + cv^2))`, `mu = ln(mean) - sigma^2 / 2`
    pub fn from_mean_cv(mean: f64, cv: f64) -> Result<Self> {
        if !(mean > 0.0 && mean.is_finite()) {
            return Err(SimError::invalid(format!("log-normal mean must be > 0, got {mean}")));
        }
        if !(cv > 0.0 && cv.is_finite()) {
            return Err(SimError::invalid(format!("variability must be > 0, got {cv}")));
        }
        let sigma = (1.0 + cv * cv).ln().sqrt();
        let mu = mean.ln() - 0.5 * sigma * sigma;
        Ok(Self { mu, sigma })
    }
}

/// Sampler for a group's total, strictly positive.
#[derive(Debug, Clone, Copy)]
pub struct TeamTotalSampler {
    dist: LogNormal<f64>,
}

impl TeamTotalSampler {
    pub fn new(implied_total: f64, variability: f64) -> Result<Self> {
        let params = LogNormalParams::from_mean_cv(implied_total, variability)?;
        let dist = LogNormal::new(params.mu, params.sigma)
            .map_err(|e| SimError::invalid(format!("log-normal: {e}")))?;
        Ok(Self { dist })
    }

    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.sample(rng)
    }

    pub fn sample_n<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.dist.sample(rng)).collect()
    }
}

/// Zero-mean normal noise. A zero dispersion always yields exactly 0.
#[derive(Debug, Clone, Copy)]
pub struct NoiseSampler {
    dist: Option<Normal<f64>>,
}

impl NoiseSampler {
    pub fn new(dispersion: f64) -> Result<Self> {
        check_dispersion(dispersion)?;
        if dispersion == 0.0 {
            return Ok(Self { dist: None });
        }
        let dist = Normal::new(0.0, dispersion)
            .map_err(|e| SimError::invalid(format!("normal: {e}")))?;
        Ok(Self { dist: Some(dist) })
    }

    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.dist {
            Some(dist) => dist.sample(rng),
            None => 0.0,
        }
    }
}

/// Sampler for `Normal(base, dispersion) * team_share`. Negative draws are kept.
#[derive(Debug, Clone, Copy)]
pub struct PlayerPointsSampler {
    base: f64,
    team_share: f64,
    noise: NoiseSampler,
}

impl PlayerPointsSampler {
    pub fn new(base: f64, dispersion: f64, team_share: f64) -> Result<Self> {
        if !(team_share >= 0.0 && team_share.is_finite()) {
            return Err(SimError::invalid(format!("team_share must be >= 0, got {team_share}")));
        }
        Ok(Self { base, team_share, noise: NoiseSampler::new(dispersion)? })
    }

    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        (self.base + self.noise.sample(rng)) * self.team_share
    }

    pub fn sample_n<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}

/// Ace and double-fault counts for one service game.
#[derive(Debug, Clone, Copy)]
pub struct ServeEventSampler {
    aces: Binomial,
    double_faults: Binomial,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeEvents {
    pub aces: u32,
    pub double_faults: u32,
}

impl ServeEventSampler {
    pub fn new(serves: u64, ace_rate: f64, double_fault_rate: f64) -> Result<Self> {
        let aces = Binomial::new(serves, ace_rate)
            .map_err(|e| SimError::invalid(format!("ace rate {ace_rate}: {e}")))?;
        let double_faults = Binomial::new(serves, double_fault_rate)
            .map_err(|e| SimError::invalid(format!("double fault rate {double_fault_rate}: {e}")))?;
        Ok(Self { aces, double_faults })
    }

    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ServeEvents {
        ServeEvents {
            aces: self.aces.sample(rng) as u32,
            double_faults: self.double_faults.sample(rng) as u32,
        }
    }
}

fn check_dispersion(dispersion: f64) -> Result<()> {
    if dispersion >= 0.0 && dispersion.is_finite() {
        Ok(())
    } else {
        Err(SimError::invalid(format!("dispersion must be >= 0, got {dispersion}")))
    }
}
