//! # Match Batches
//!
//! Repeats one pairing many times to build an empirical distribution of
//! fantasy points and match outcomes. Match `i` always draws from ChaCha
//! stream `i` of the batch seed, so sequential and parallel batches agree.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::format::MatchFormat;
use super::simulator::{MatchResult, MatchSimulator};
use super::state::Side;
use super::stats::{PlayerRateStats, PlayerStatsTable, Surface};
use crate::analysis::OutcomeSummary;
use crate::config::TennisConfig;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchDistribution {
    pub player1: String,
    pub player2: String,
    pub format: MatchFormat,
    pub seed: u64,
    pub matches: usize,
    pub player1_wins: usize,
    pub player1_win_probability: f64,
    pub player2_win_probability: f64,
    pub player1_points: Option<OutcomeSummary>,
    pub player2_points: Option<OutcomeSummary>,
    pub mean_sets: f64,
    pub mean_games: f64,
    /// Share of matches with at least one tie-break
    pub tiebreak_rate: f64,
    pub straight_sets_rate: f64,
}

impl MatchDistribution {
    pub fn from_results(
        player1: &str,
        player2: &str,
        format: MatchFormat,
        seed: u64,
        results: &[MatchResult],
    ) -> Self {
        let matches = results.len();
        let mut dist = Self {
            player1: player1.to_string(),
            player2: player2.to_string(),
            format,
            seed,
            matches,
            ..Default::default()
        };
        if matches == 0 {
            return dist;
        }

        let n = matches as f64;
        let rate = |count: usize| count as f64 / n;
        dist.player1_wins = results.iter().filter(|r| r.winner == Side::Player1).count();
        dist.player1_win_probability = rate(dist.player1_wins);
        dist.player2_win_probability = rate(matches - dist.player1_wins);

        let p1: Vec<f64> = results.iter().map(|r| r.player1_fantasy_points).collect();
        let p2: Vec<f64> = results.iter().map(|r| r.player2_fantasy_points).collect();
        dist.player1_points = OutcomeSummary::from_values(&p1);
        dist.player2_points = OutcomeSummary::from_values(&p2);

        dist.mean_sets = results.iter().map(|r| r.sets.len()).sum::<usize>() as f64 / n;
        dist.mean_games = results.iter().map(|r| r.total_games() as f64).sum::<f64>() / n;
        dist.tiebreak_rate = rate(results.iter().filter(|r| r.tiebreaks() > 0).count());
        dist.straight_sets_rate = rate(results.iter().filter(|r| r.straight_sets()).count());
        dist
    }
}

/// Runs `num_matches` independent matches of one pairing.
#[derive(Debug, Clone)]
pub struct MatchBatch {
    simulator: MatchSimulator,
    config: TennisConfig,
}

impl MatchBatch {
    pub fn new(player1: PlayerRateStats, player2: PlayerRateStats, config: TennisConfig) -> Result<Self> {
        config.validate()?;
        let format = MatchFormat::try_from(config.best_of)?;
        let simulator = MatchSimulator::new(player1, player2, format, config.serves_per_game)?;
        Ok(Self { simulator, config })
    }

    /// Look both players up on `surface`; missing or invalid rows fail here,
    /// before any match is played.
    pub fn from_table(
        table: &PlayerStatsTable,
        player1: &str,
        player2: &str,
        surface: Surface,
        config: TennisConfig,
    ) -> Result<Self> {
        let p1 = table.require(player1, surface)?;
        let p2 = table.require(player2, surface)?;
        Self::new(p1, p2, config)
    }

    pub fn simulator(&self) -> &MatchSimulator {
        &self.simulator
    }

    /// Every match result in order, using the configured seed or a fresh one.
    pub fn run_results(&self) -> Result<(u64, Vec<MatchResult>)> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let n = self.config.num_matches;
        info!(
            player1 = %self.simulator.player(Side::Player1).player,
            player2 = %self.simulator.player(Side::Player2).player,
            matches = n,
            seed,
            parallel = self.config.parallel,
            "match batch started"
        );

        let play = |i: usize| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(i as u64);
            self.simulator.simulate_match(Side::Player1, &mut rng)
        };
        let results = if self.config.parallel {
            (0..n).into_par_iter().map(play).collect::<Result<Vec<_>>>()?
        } else {
            (0..n).map(play).collect::<Result<Vec<_>>>()?
        };
        Ok((seed, results))
    }

    pub fn run(&self) -> Result<MatchDistribution> {
        let (seed, results) = self.run_results()?;
        let dist = MatchDistribution::from_results(
            &self.simulator.player(Side::Player1).player,
            &self.simulator.player(Side::Player2).player,
            self.simulator.format(),
            seed,
            &results,
        );
        info!(
            player1_win_probability = dist.player1_win_probability,
            mean_games = dist.mean_games,
            "match batch finished"
        );
        Ok(dist)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub player1: String,
    pub player2: String,
    pub surface: Surface,
}

impl Matchup {
    pub fn new(player1: impl Into<String>, player2: impl Into<String>, surface: Surface) -> Self {
        Self { player1: player1.into(), player2: player2.into(), surface }
    }
}

/// Simulate every pairing independently. A pairing with missing or invalid
/// statistics gets its own `Err`; the others still run. Pairing `k` uses
/// `seed + k` when a seed is configured.
pub fn run_matchups(
    table: &PlayerStatsTable,
    matchups: &[Matchup],
    config: &TennisConfig,
) -> Vec<(Matchup, Result<MatchDistribution>)> {
    matchups
        .iter()
        .enumerate()
        .map(|(k, matchup)| {
            let config = TennisConfig {
                seed: config.seed.map(|s| s.wrapping_add(k as u64)),
                ..config.clone()
            };
            let outcome = MatchBatch::from_table(
                table,
                &matchup.player1,
                &matchup.player2,
                matchup.surface,
                config,
            )
            .and_then(|batch| batch.run());
            if let Err(e) = &outcome {
                warn!(
                    player1 = %matchup.player1,
                    player2 = %matchup.player2,
                    error = %e,
                    "matchup skipped"
                );
            }
            (matchup.clone(), outcome)
        })
        .collect()
}
