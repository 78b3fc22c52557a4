//! # Simulation Runner
//!
//! Runs N independent trials over a roster. Each trial draws every group
//! total and every entity outcome exactly once from the run's RNG.
//!
//! Sequential runs use one `ChaCha8Rng` seeded from the config. Parallel
//! runs split the trial range into shards of `chunk_size`; shard `k` uses the
//! same seed on ChaCha stream `k`, so results depend only on the seed and
//! the chunk size, never on thread scheduling.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::correlation::{AlignmentReport, CorrelationEngine};
use super::distributions::TeamTotalSampler;
use super::observer::{NoopObserver, SimObserver};
use super::trial::{TrialMatrix, TrialMatrixBuilder};
use crate::config::SimConfig;
use crate::error::Result;
use crate::models::Roster;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutput {
    pub matrix: TrialMatrix,
    pub alignment: AlignmentReport,
    /// Seed the run actually used
    pub seed: u64,
    pub requested_trials: usize,
    /// True when an observer stopped the run before `requested_trials`
    pub cancelled: bool,
}

impl SimulationOutput {
    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }
}

/// Everything a worker needs to produce trials for one roster.
struct TrialPlan {
    engine: CorrelationEngine,
    group_samplers: Vec<TeamTotalSampler>,
    entity_ids: Vec<String>,
    group_ids: Vec<String>,
}

impl TrialPlan {
    fn new(roster: &Roster, config: &SimConfig) -> Result<Self> {
        let engine = CorrelationEngine::new(roster, config)?;

        let mut group_samplers = Vec::new();
        let mut group_ids = Vec::new();
        for group in roster.groups() {
            if let Some(total) = group.implied_total {
                group_samplers.push(TeamTotalSampler::new(total, config.team_variability)?);
                group_ids.push(group.id.clone());
            }
        }

        Ok(Self {
            engine,
            group_samplers,
            entity_ids: roster.entities().iter().map(|e| e.id.clone()).collect(),
            group_ids,
        })
    }

    fn run_shard<R: Rng + ?Sized>(
        &self,
        trials: usize,
        rng: &mut R,
        observer: &dyn SimObserver,
    ) -> (TrialMatrixBuilder, AlignmentReport, bool) {
        let mut builder =
            TrialMatrixBuilder::new(self.entity_ids.clone(), self.group_ids.clone(), trials);
        let mut alignment = self.engine.new_alignment_report();
        let mut entity_row = vec![0.0; self.entity_ids.len()];
        let mut group_row = vec![0.0; self.group_ids.len()];

        for t in 0..trials {
            if observer.should_stop() {
                return (builder, alignment, true);
            }
            for (slot, sampler) in group_row.iter_mut().zip(&self.group_samplers) {
                *slot = sampler.sample(rng);
            }
            self.engine.draw_trial(rng, &mut entity_row, &mut alignment);
            builder.push_trial(&entity_row, &group_row);
            observer.on_trial_complete(t + 1);
        }
        (builder, alignment, false)
    }
}

pub struct SimulationRunner {
    config: SimConfig,
}

impl SimulationRunner {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run `config.num_simulations` trials.
    pub fn run(&self, roster: &Roster) -> Result<SimulationOutput> {
        self.run_with_observer(roster, self.config.num_simulations, &NoopObserver)
    }

    pub fn run_with_observer(
        &self,
        roster: &Roster,
        trials: usize,
        observer: &dyn SimObserver,
    ) -> Result<SimulationOutput> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        if self.config.parallel {
            self.run_parallel(roster, trials, seed, observer)
        } else {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut output = self.run_with_rng(roster, trials, &mut rng, observer)?;
            output.seed = seed;
            Ok(output)
        }
    }

    /// Sequential run on a caller-supplied RNG. An empty roster or zero
    /// trials yields an empty matrix.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        roster: &Roster,
        trials: usize,
        rng: &mut R,
        observer: &dyn SimObserver,
    ) -> Result<SimulationOutput> {
        if roster.is_empty() || trials == 0 {
            info!(entities = roster.len(), trials, "empty simulation request, nothing to run");
            return Ok(empty_output(trials));
        }

        let plan = TrialPlan::new(roster, &self.config)?;
        info!(entities = roster.len(), groups = plan.group_ids.len(), trials, "simulation started");

        let (builder, alignment, cancelled) = plan.run_shard(trials, rng, observer);
        let matrix = builder.build();
        info!(completed = matrix.trials(), cancelled, "simulation finished");

        Ok(SimulationOutput {
            matrix,
            alignment,
            seed: 0,
            requested_trials: trials,
            cancelled,
        })
    }

    fn run_parallel(
        &self,
        roster: &Roster,
        trials: usize,
        seed: u64,
        observer: &dyn SimObserver,
    ) -> Result<SimulationOutput> {
        if roster.is_empty() || trials == 0 {
            info!(entities = roster.len(), trials, "empty simulation request, nothing to run");
            let mut output = empty_output(trials);
            output.seed = seed;
            return Ok(output);
        }

        let plan = TrialPlan::new(roster, &self.config)?;
        let chunk = self.config.chunk_size;
        let shards = trials.div_ceil(chunk);
        info!(entities = roster.len(), trials, shards, "parallel simulation started");

        let results: Vec<_> = (0..shards)
            .into_par_iter()
            .map(|k| {
                let len = chunk.min(trials - k * chunk);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(k as u64);
                debug!(shard = k, len, "shard started");
                plan.run_shard(len, &mut rng, observer)
            })
            .collect();

        let mut results = results.into_iter();
        let Some((mut builder, mut alignment, mut cancelled)) = results.next() else {
            return Ok(empty_output(trials));
        };
        for (shard, shard_alignment, shard_cancelled) in results {
            builder.append(shard);
            alignment.merge(&shard_alignment);
            cancelled |= shard_cancelled;
        }

        let matrix = builder.build();
        info!(completed = matrix.trials(), cancelled, "parallel simulation finished");
        Ok(SimulationOutput { matrix, alignment, seed, requested_trials: trials, cancelled })
    }
}

fn empty_output(trials: usize) -> SimulationOutput {
    SimulationOutput {
        matrix: TrialMatrix::default(),
        alignment: AlignmentReport::default(),
        seed: 0,
        requested_trials: trials,
        cancelled: false,
    }
}
