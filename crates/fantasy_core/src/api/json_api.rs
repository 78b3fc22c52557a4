//! JSON string entry points for callers outside Rust.
//!
//! Both functions take a request carrying `schema_version` and `seed` and
//! return a response stamped with a fresh `run_id` and `generated_at`. Apart
//! from those two fields the same request always produces the same JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use crate::analysis::{OutcomeSummary, PairCorrelation, Summarizer};
use crate::config::{SimConfig, TennisConfig};
use crate::engine::SimulationRunner;
use crate::error::{Result, SimError};
use crate::models::{EntityRecord, GroupRecord, Roster};
use crate::tennis::{MatchBatch, MatchDistribution, PlayerStatsTable, Surface};
use crate::SCHEMA_VERSION;

fn check_schema(version: u8) -> Result<()> {
    if version == SCHEMA_VERSION {
        Ok(())
    } else {
        Err(SimError::invalid(format!("Unsupported schema version: {version}")))
    }
}

// ========== Slate ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerData {
    pub id: String,
    #[serde(default)]
    pub position: Option<String>,
    pub base_projection: f64,
    #[serde(default)]
    pub dispersion: Option<f64>,
    #[serde(default)]
    pub usage_share: Option<f64>,
    #[serde(default)]
    pub is_driver: Option<bool>,
    #[serde(default)]
    pub team_share: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamData {
    pub name: String,
    #[serde(default)]
    pub implied_total: Option<f64>,
    #[serde(default)]
    pub players: Vec<PlayerData>,
}

/// Flatten team-nested input into a validated roster.
pub fn roster_from_teams(teams: Vec<TeamData>, config: &SimConfig) -> Result<Roster> {
    let mut groups = Vec::with_capacity(teams.len());
    let mut records = Vec::new();
    for team in teams {
        groups.push(GroupRecord::new(team.name.clone(), team.implied_total));
        records.extend(team.players.into_iter().map(|p| EntityRecord {
            id: p.id,
            group_id: team.name.clone(),
            position: p.position,
            base_projection: p.base_projection,
            dispersion: p.dispersion,
            usage_share: p.usage_share,
            is_driver: p.is_driver,
            team_share: p.team_share,
        }));
    }
    Roster::build(groups, records, config)
}

#[derive(Debug, Deserialize)]
pub struct SlateRequest {
    pub schema_version: u8,
    pub seed: u64,
    #[serde(default)]
    pub num_simulations: Option<usize>,
    #[serde(default)]
    pub config: Option<SimConfig>,
    #[serde(default)]
    pub teams: Vec<TeamData>,
    #[serde(default)]
    pub correlation_pairs: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentBucket {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAlignment {
    pub group_id: String,
    pub tracked: Vec<String>,
    pub trials: u64,
    pub buckets: Vec<AlignmentBucket>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlateResponse {
    pub schema_version: u8,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub total_trials: usize,
    pub team_scores: BTreeMap<String, OutcomeSummary>,
    pub player_summaries: BTreeMap<String, OutcomeSummary>,
    pub correlations: Vec<PairCorrelation>,
    pub driver_correlations: Vec<PairCorrelation>,
    pub alignment: Vec<GroupAlignment>,
    pub stacks: BTreeMap<String, OutcomeSummary>,
    pub insufficient_data: Vec<String>,
}

/// Simulate a slate of teams from a JSON request.
pub fn simulate_slate_json(request_json: &str) -> Result<String> {
    let request: SlateRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;

    let mut config = request.config.unwrap_or_default();
    config.seed = Some(request.seed);
    if let Some(n) = request.num_simulations {
        config.num_simulations = n;
    }
    config.validate()?;

    let roster = roster_from_teams(request.teams, &config)?;
    let runner = SimulationRunner::new(config)?;
    let output = runner.run(&roster)?;
    let summary = Summarizer::summarize_output(&output, &roster, &request.correlation_pairs);

    let alignment = summary
        .alignment
        .groups
        .iter()
        .map(|counts| GroupAlignment {
            group_id: counts.group_id.clone(),
            tracked: counts.tracked.clone(),
            trials: counts.trials,
            buckets: counts
                .labeled()
                .into_iter()
                .map(|(label, count)| AlignmentBucket { label, count })
                .collect(),
        })
        .collect();

    let response = SlateResponse {
        schema_version: SCHEMA_VERSION,
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        seed: output.seed,
        total_trials: summary.total_trials,
        team_scores: summary.groups,
        player_summaries: summary.entities,
        correlations: summary.correlations,
        driver_correlations: summary.driver_correlations,
        alignment,
        stacks: summary.stacks,
        insufficient_data: summary.insufficient_data,
    };
    info!(run_id = %response.run_id, trials = response.total_trials, "slate simulated");
    Ok(serde_json::to_string(&response)?)
}

// ========== Tennis ==========

fn default_best_of() -> u8 {
    3
}

fn default_num_matches() -> usize {
    1_000
}

#[derive(Debug, Deserialize)]
pub struct TennisRequest {
    pub schema_version: u8,
    pub seed: u64,
    #[serde(default = "default_best_of")]
    pub best_of: u8,
    #[serde(default = "default_num_matches")]
    pub num_matches: usize,
    pub surface: String,
    pub player1: String,
    pub player2: String,
    #[serde(default)]
    pub parallel: bool,
    pub stats: Vec<crate::tennis::PlayerStatsRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TennisResponse {
    pub schema_version: u8,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub surface: Surface,
    #[serde(flatten)]
    pub distribution: MatchDistribution,
}

/// Simulate repeated matches between two players from a JSON request.
pub fn simulate_tennis_json(request_json: &str) -> Result<String> {
    let request: TennisRequest = serde_json::from_str(request_json)?;
    check_schema(request.schema_version)?;

    let surface: Surface = request.surface.parse()?;
    let config = TennisConfig {
        best_of: request.best_of,
        num_matches: request.num_matches,
        seed: Some(request.seed),
        parallel: request.parallel,
        ..Default::default()
    };
    let table = PlayerStatsTable::from_records(request.stats);
    let batch = MatchBatch::from_table(&table, &request.player1, &request.player2, surface, config)?;
    let distribution = batch.run()?;

    let response = TennisResponse {
        schema_version: SCHEMA_VERSION,
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        surface,
        distribution,
    };
    info!(run_id = %response.run_id, matches = response.distribution.matches, "tennis batch simulated");
    Ok(serde_json::to_string(&response)?)
}
