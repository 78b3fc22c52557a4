//! # Summarizer
//!
//! Reduces a trial matrix to per-entity percentiles and means, pairwise
//! Pearson correlations, driver correlations and group stack totals.
//!
//! An entity with fewer than two usable trial values gets no percentile set;
//! it is listed in `insufficient_data` and logged instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::correlation::{pearson, CorrelationMatrix, PairCorrelation};
use super::percentiles::OutcomeSummary;
use super::stacks::group_stack_totals;
use crate::engine::{AlignmentReport, SimulationOutput, TrialMatrix};
use crate::models::Roster;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_trials: usize,
    /// Entities with at least two usable trial values
    pub entities: BTreeMap<String, OutcomeSummary>,
    pub groups: BTreeMap<String, OutcomeSummary>,
    pub correlations: Vec<PairCorrelation>,
    pub driver_correlations: Vec<PairCorrelation>,
    pub stacks: BTreeMap<String, OutcomeSummary>,
    pub alignment: AlignmentReport,
    /// Entities flagged for having too few trial values to summarize
    pub insufficient_data: Vec<String>,
}

impl Summary {
    /// "No data": nothing was simulated or nothing could be summarized.
    pub fn is_empty(&self) -> bool {
        self.total_trials == 0 || (self.entities.is_empty() && self.groups.is_empty())
    }

    pub fn entity(&self, id: &str) -> Option<&OutcomeSummary> {
        self.entities.get(id)
    }

    pub fn correlation(&self, a: &str, b: &str) -> Option<f64> {
        self.correlations
            .iter()
            .chain(&self.driver_correlations)
            .find(|c| (c.entity_a == a && c.entity_b == b) || (c.entity_a == b && c.entity_b == a))
            .and_then(|c| c.correlation)
    }
}

pub struct Summarizer;

impl Summarizer {
    /// Percentiles for every entity and group, correlations for the requested pairs.
    pub fn summarize(matrix: &TrialMatrix, pairs: &[(String, String)]) -> Summary {
        let mut summary = Summary { total_trials: matrix.trials(), ..Default::default() };
        if matrix.is_empty() {
            info!("no trials to summarize");
            return summary;
        }

        for (id, values) in matrix.entity_columns() {
            match OutcomeSummary::from_values(values) {
                Some(outcome) => {
                    summary.entities.insert(id.to_string(), outcome);
                }
                None => {
                    warn!(entity = id, samples = values.len(), "insufficient data for percentiles");
                    summary.insufficient_data.push(id.to_string());
                }
            }
        }

        for (id, values) in matrix.group_columns() {
            match OutcomeSummary::from_values(values) {
                Some(outcome) => {
                    summary.groups.insert(id.to_string(), outcome);
                }
                None => {
                    warn!(group = id, samples = values.len(), "insufficient data for percentiles");
                    summary.insufficient_data.push(id.to_string());
                }
            }
        }

        summary.correlations = pairs
            .iter()
            .map(|(a, b)| Self::pair_correlation(matrix, a, b))
            .collect();

        summary
    }

    /// Full summary of a run: adds driver correlations, stack totals and alignment.
    pub fn summarize_output(
        output: &SimulationOutput,
        roster: &Roster,
        pairs: &[(String, String)],
    ) -> Summary {
        let matrix = &output.matrix;
        let mut summary = Self::summarize(matrix, pairs);
        summary.alignment = output.alignment.clone();
        if matrix.is_empty() {
            return summary;
        }

        summary.driver_correlations = Self::driver_correlations(matrix, roster);

        for (group_id, totals) in group_stack_totals(matrix, roster) {
            if let Some(outcome) = OutcomeSummary::from_values(&totals) {
                summary.stacks.insert(group_id, outcome);
            }
        }

        summary
    }

    /// Correlation of each teammate with its group's driver.
    pub fn driver_correlations(matrix: &TrialMatrix, roster: &Roster) -> Vec<PairCorrelation> {
        let entities = roster.entities();
        roster
            .groups()
            .iter()
            .filter_map(|g| g.driver.map(|d| (g, d)))
            .flat_map(|(group, driver)| {
                group.teammates().map(move |mate| {
                    Self::pair_correlation(matrix, &entities[mate].id, &entities[driver].id)
                })
            })
            .collect()
    }

    pub fn correlation_matrix(matrix: &TrialMatrix) -> CorrelationMatrix {
        CorrelationMatrix::from_matrix(matrix)
    }

    fn pair_correlation(matrix: &TrialMatrix, a: &str, b: &str) -> PairCorrelation {
        let correlation = match (matrix.entity_outcomes(a), matrix.entity_outcomes(b)) {
            (Some(xs), Some(ys)) => pearson(xs, ys),
            _ => {
                warn!(entity_a = a, entity_b = b, "correlation requested for unknown entity");
                None
            }
        };
        PairCorrelation { entity_a: a.to_string(), entity_b: b.to_string(), correlation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::engine::{SimulationRunner, TrialMatrixBuilder};
    use crate::models::{EntityRecord, GroupRecord};

    fn reference_team() -> Vec<EntityRecord> {
        vec![
            EntityRecord::new("QB_Team_A", "Team_A", 20.0).with_position("QB"),
            EntityRecord::new("WR1_Team_A", "Team_A", 18.0).with_position("WR1"),
            EntityRecord::new("WR2_Team_A", "Team_A", 15.0).with_position("WR2"),
            EntityRecord::new("WR3_Team_A", "Team_A", 12.0).with_position("WR3"),
            EntityRecord::new("TE_Team_A", "Team_A", 10.0).with_position("TE"),
            EntityRecord::new("RB_Team_A", "Team_A", 16.0).with_position("RB"),
            EntityRecord::new("DST_Team_A", "Team_A", 8.0).with_position("DST"),
        ]
    }

    fn run(config: SimConfig) -> (Summary, Roster) {
        let roster = Roster::build(
            vec![GroupRecord::new("Team_A", Some(24.0))],
            reference_team(),
            &config,
        )
        .unwrap();
        let output = SimulationRunner::new(config).unwrap().run(&roster).unwrap();
        let pairs = vec![("WR1_Team_A".to_string(), "QB_Team_A".to_string())];
        (Summarizer::summarize_output(&output, &roster, &pairs), roster)
    }

    #[test]
    fn test_reference_scenario_summary() {
        let (summary, _) = run(SimConfig { seed: Some(2024), ..Default::default() });

        assert_eq!(summary.total_trials, 10_000);
        assert_eq!(summary.entities.len(), 7);
        assert!(summary.insufficient_data.is_empty());
        for outcome in summary.entities.values() {
            assert!(outcome.percentiles.is_monotonic());
            assert!(outcome.percentiles.p25 >= 0.0);
        }

        let wr1_qb = summary.correlation("WR1_Team_A", "QB_Team_A").unwrap();
        assert!(wr1_qb > 0.3, "WR1/QB correlation {wr1_qb}");
        assert_eq!(summary.driver_correlations.len(), 6);

        let team_total = summary.groups.get("Team_A").unwrap();
        assert!((team_total.mean - 24.0).abs() < 0.5);
        assert!(summary.stacks.contains_key("Team_A"));

        let alignment = summary.alignment.group("Team_A").unwrap();
        assert_eq!(alignment.trials, 10_000);
        assert_eq!(alignment.counts.iter().sum::<u64>(), 10_000);
    }

    #[test]
    fn test_zero_factor_decorrelates_teammates() {
        let (summary, roster) = run(SimConfig {
            seed: Some(99),
            correlation_factor: 0.0,
            num_simulations: 20_000,
            ..Default::default()
        });
        for mate in roster.group("Team_A").unwrap().teammates() {
            let id = &roster.entities()[mate].id;
            let r = summary.correlation(id, "QB_Team_A").unwrap();
            assert!(r.abs() < 0.05, "{id} correlated with QB at {r}");
        }
    }

    #[test]
    fn test_empty_matrix_reports_no_data() {
        let summary = Summarizer::summarize(&TrialMatrix::default(), &[]);
        assert!(summary.is_empty());
        assert!(summary.entities.is_empty());
    }

    #[test]
    fn test_single_trial_is_flagged_not_zero_filled() {
        let mut builder = TrialMatrixBuilder::new(vec!["solo".into()], vec![], 1);
        builder.push_trial(&[12.0], &[]);
        let summary = Summarizer::summarize(&builder.build(), &[]);

        assert!(summary.entity("solo").is_none());
        assert_eq!(summary.insufficient_data, vec!["solo".to_string()]);
    }

    #[test]
    fn test_unknown_pair_is_absent() {
        let mut builder = TrialMatrixBuilder::new(vec!["a".into()], vec![], 2);
        builder.push_trial(&[1.0], &[]);
        builder.push_trial(&[2.0], &[]);
        let pairs = vec![("a".to_string(), "ghost".to_string())];
        let summary = Summarizer::summarize(&builder.build(), &pairs);
        assert_eq!(summary.correlations.len(), 1);
        assert_eq!(summary.correlations[0].correlation, None);
    }
}
