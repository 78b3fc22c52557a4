//! # Correlation Engine
//!
//! A group's driver (usually the QB) draws one independent shock per trial.
//! That shock, scaled by `correlation_factor`, becomes the team shock; every
//! teammate receives `team_shock * usage_share` on top of its own
//! independent noise:
//!
//! ```text
//! driver   = base + shock
//! teammate = base + shock * factor * usage_share + noise(dispersion)
//! ```
//!
//! Outcomes are scaled by the entity's team share and clamped at the
//! configured floor. Groups without a driver fall back to `base + noise`.
//!
//! Per trial, the engine also records how many tracked positions moved in
//! the same direction as the driver (see [`AlignmentCounts`]).

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::distributions::NoiseSampler;
use crate::config::SimConfig;
use crate::error::Result;
use crate::models::Roster;

/// Direction of a deviation from base. Exactly zero is `Flat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Direction::Up
        } else if value < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }
}

/// Histogram of per-trial alignment for one group: `counts[n]` is the number
/// of trials in which exactly `n` tracked teammates moved with the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentCounts {
    pub group_id: String,
    pub tracked: Vec<String>,
    pub counts: Vec<u64>,
    pub trials: u64,
}

impl AlignmentCounts {
    fn new(group_id: String, tracked: Vec<String>) -> Self {
        let counts = vec![0; tracked.len() + 1];
        Self { group_id, tracked, counts, trials: 0 }
    }

    fn record(&mut self, aligned: usize) {
        self.counts[aligned] += 1;
        self.trials += 1;
    }

    pub fn all_aligned(&self) -> u64 {
        self.counts.last().copied().unwrap_or(0)
    }

    pub fn none_aligned(&self) -> u64 {
        self.counts.first().copied().unwrap_or(0)
    }

    pub fn fraction(&self, aligned: usize) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.counts.get(aligned).copied().unwrap_or(0) as f64 / self.trials as f64
    }

    /// Buckets named the way the slate report prints them ("all_five",
    /// "four_of_five", ..., "zero_of_five"), most aligned first.
    pub fn labeled(&self) -> Vec<(String, u64)> {
        let k = self.tracked.len();
        (0..=k)
            .rev()
            .map(|n| {
                let label = if n == k && k > 0 {
                    format!("all_{}", number_word(k))
                } else {
                    format!("{}_of_{}", number_word(n), number_word(k))
                };
                (label, self.counts[n])
            })
            .collect()
    }

    pub(crate) fn merge(&mut self, other: &AlignmentCounts) {
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            *mine += theirs;
        }
        self.trials += other.trials;
    }
}

fn number_word(n: usize) -> String {
    const WORDS: [&str; 11] =
        ["zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten"];
    WORDS.get(n).map(|w| w.to_string()).unwrap_or_else(|| n.to_string())
}

/// Alignment histograms for every group that has a driver and at least one
/// tracked teammate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub groups: Vec<AlignmentCounts>,
}

impl AlignmentReport {
    pub fn group(&self, group_id: &str) -> Option<&AlignmentCounts> {
        self.groups.iter().find(|g| g.group_id == group_id)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.trials == 0)
    }

    pub(crate) fn merge(&mut self, other: &AlignmentReport) {
        for (mine, theirs) in self.groups.iter_mut().zip(&other.groups) {
            debug_assert_eq!(mine.group_id, theirs.group_id);
            mine.merge(theirs);
        }
    }
}

#[derive(Debug, Clone)]
struct EntityPlan {
    base: f64,
    usage_share: f64,
    team_share: f64,
    noise: NoiseSampler,
}

#[derive(Debug, Clone)]
struct GroupPlan {
    driver: Option<usize>,
    teammates: Vec<usize>,
    /// Teammates whose direction is tallied against the driver
    tracked: Vec<usize>,
    /// Slot in the alignment report, when tracked is non-empty
    alignment_slot: Option<usize>,
}

/// Precompiled sampling plan for a roster.
#[derive(Debug, Clone)]
pub struct CorrelationEngine {
    entities: Vec<EntityPlan>,
    groups: Vec<GroupPlan>,
    correlation_factor: f64,
    floor: Option<f64>,
    alignment_template: AlignmentReport,
}

impl CorrelationEngine {
    pub fn new(roster: &Roster, config: &SimConfig) -> Result<Self> {
        let entities = roster
            .entities()
            .iter()
            .map(|e| {
                Ok(EntityPlan {
                    base: e.base_projection,
                    usage_share: e.usage_share,
                    team_share: e.team_share,
                    noise: NoiseSampler::new(e.dispersion)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut alignment_template = AlignmentReport::default();
        let groups = roster
            .groups()
            .iter()
            .map(|g| {
                let teammates: Vec<usize> = g.teammates().collect();
                let tracked: Vec<usize> = match g.driver {
                    Some(_) => teammates
                        .iter()
                        .copied()
                        .filter(|&i| {
                            config
                                .alignment_positions
                                .iter()
                                .any(|pos| roster.entities()[i].is_at(pos))
                        })
                        .collect(),
                    None => Vec::new(),
                };
                let alignment_slot = if tracked.is_empty() {
                    None
                } else {
                    alignment_template.groups.push(AlignmentCounts::new(
                        g.id.clone(),
                        tracked.iter().map(|&i| roster.entities()[i].id.clone()).collect(),
                    ));
                    Some(alignment_template.groups.len() - 1)
                };
                GroupPlan { driver: g.driver, teammates, tracked, alignment_slot }
            })
            .collect();

        Ok(Self {
            entities,
            groups,
            correlation_factor: config.correlation_factor,
            floor: config.outcome_floor,
            alignment_template,
        })
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Empty report shaped for this roster, ready to accumulate trials.
    pub fn new_alignment_report(&self) -> AlignmentReport {
        self.alignment_template.clone()
    }

    #[inline]
    fn finish(&self, plan: &EntityPlan, raw: f64) -> f64 {
        let scaled = raw * plan.team_share;
        match self.floor {
            Some(floor) => scaled.max(floor),
            None => scaled,
        }
    }

    /// Draw one trial: writes every entity's outcome into `outcomes`
    /// (indexed like `Roster::entities`) and tallies alignment.
    pub fn draw_trial<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        outcomes: &mut [f64],
        alignment: &mut AlignmentReport,
    ) {
        debug_assert_eq!(outcomes.len(), self.entities.len());

        for group in &self.groups {
            let Some(driver) = group.driver else {
                for &i in &group.teammates {
                    let plan = &self.entities[i];
                    outcomes[i] = self.finish(plan, plan.base + plan.noise.sample(rng));
                }
                continue;
            };

            let driver_plan = &self.entities[driver];
            let shock = driver_plan.noise.sample(rng);
            outcomes[driver] = self.finish(driver_plan, driver_plan.base + shock);
            let team_shock = shock * self.correlation_factor;
            let driver_direction = Direction::of(shock);

            let mut aligned = 0usize;
            for &i in &group.teammates {
                let plan = &self.entities[i];
                let deviation = team_shock * plan.usage_share + plan.noise.sample(rng);
                outcomes[i] = self.finish(plan, plan.base + deviation);

                if group.tracked.contains(&i) && Direction::of(deviation) == driver_direction {
                    aligned += 1;
                }
            }

            if let Some(slot) = group.alignment_slot {
                alignment.groups[slot].record(aligned);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityRecord, GroupRecord};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn team_a(teammate_dispersion: Option<f64>) -> Vec<EntityRecord> {
        let mut records = vec![EntityRecord::new("QB_A", "A", 20.0).with_position("QB")];
        for (pos, base) in [("WR1", 18.0), ("WR2", 15.0), ("WR3", 12.0), ("TE", 10.0), ("RB", 16.0)] {
            let mut record = EntityRecord::new(format!("{pos}_A"), "A", base).with_position(pos);
            if let Some(d) = teammate_dispersion {
                record = record.with_dispersion(d);
            }
            records.push(record);
        }
        records.push(EntityRecord::new("DST_A", "A", 8.0).with_position("DST"));
        records
    }

    fn roster(records: Vec<EntityRecord>, config: &SimConfig) -> Roster {
        Roster::build(vec![GroupRecord::new("A", Some(24.0))], records, config).unwrap()
    }

    #[test]
    fn test_direction_of() {
        assert_eq!(Direction::of(0.1), Direction::Up);
        assert_eq!(Direction::of(-0.1), Direction::Down);
        assert_eq!(Direction::of(0.0), Direction::Flat);
    }

    #[test]
    fn test_full_usage_aligns_every_trial() {
        let config = SimConfig::default();
        let records = team_a(Some(0.0))
            .into_iter()
            .map(|r| if r.position.as_deref() == Some("QB") { r } else { r.with_usage_share(1.0) })
            .collect();
        let roster = roster(records, &config);
        let engine = CorrelationEngine::new(&roster, &config).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut outcomes = vec![0.0; engine.entity_count()];
        let mut report = engine.new_alignment_report();
        for _ in 0..2_000 {
            engine.draw_trial(&mut rng, &mut outcomes, &mut report);
        }

        let counts = report.group("A").unwrap();
        assert_eq!(counts.tracked.len(), 5);
        assert_eq!(counts.trials, 2_000);
        assert_eq!(counts.all_aligned(), 2_000);
    }

    #[test]
    fn test_zero_dispersion_teammate_tracks_shock_exactly() {
        let mut config = SimConfig::default();
        config.outcome_floor = None;
        let records = vec![
            EntityRecord::new("QB", "A", 20.0).with_position("QB").with_dispersion(6.0),
            EntityRecord::new("WR1", "A", 18.0).with_position("WR1").with_dispersion(0.0),
        ];
        let roster = roster(records, &config);
        let engine = CorrelationEngine::new(&roster, &config).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut outcomes = vec![0.0; 2];
        let mut report = engine.new_alignment_report();
        for _ in 0..100 {
            engine.draw_trial(&mut rng, &mut outcomes, &mut report);
            let shock = outcomes[0] - 20.0;
            let expected = 18.0 + shock * 2.0 * 0.35;
            assert!((outcomes[1] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_floor_clamps_outcomes() {
        let config = SimConfig::default();
        let records = vec![
            EntityRecord::new("QB", "A", 1.0).with_position("QB").with_dispersion(10.0),
            EntityRecord::new("WR1", "A", 1.0).with_position("WR1").with_dispersion(10.0),
        ];
        let roster = roster(records, &config);
        let engine = CorrelationEngine::new(&roster, &config).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut outcomes = vec![0.0; 2];
        let mut report = engine.new_alignment_report();
        let mut saw_floor = false;
        for _ in 0..1_000 {
            engine.draw_trial(&mut rng, &mut outcomes, &mut report);
            assert!(outcomes.iter().all(|&o| o >= 0.0));
            saw_floor |= outcomes.iter().any(|&o| o == 0.0);
        }
        assert!(saw_floor);
    }

    #[test]
    fn test_group_without_driver_has_no_alignment() {
        let config = SimConfig::default();
        let records = vec![
            EntityRecord::new("WR1_B", "B", 12.0).with_position("WR1"),
            EntityRecord::new("RB_B", "B", 10.0).with_position("RB"),
        ];
        let roster = Roster::build(vec![], records, &config).unwrap();
        let engine = CorrelationEngine::new(&roster, &config).unwrap();
        assert!(engine.new_alignment_report().groups.is_empty());

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut outcomes = vec![0.0; 2];
        let mut report = engine.new_alignment_report();
        engine.draw_trial(&mut rng, &mut outcomes, &mut report);
        assert!(outcomes.iter().all(|&o| o >= 0.0));
    }

    #[test]
    fn test_labeled_buckets() {
        let mut counts = AlignmentCounts::new(
            "A".to_string(),
            ["WR1", "WR2", "WR3", "TE", "RB"].iter().map(|s| s.to_string()).collect(),
        );
        counts.record(5);
        counts.record(0);
        counts.record(4);
        let labeled = counts.labeled();
        assert_eq!(labeled[0], ("all_five".to_string(), 1));
        assert_eq!(labeled[1], ("four_of_five".to_string(), 1));
        assert_eq!(labeled[5], ("zero_of_five".to_string(), 1));
        assert!((counts.fraction(5) - 1.0 / 3.0).abs() < 1e-12);
    }
}
