//! Fantasy Sim CLI Library
//!
//! File loaders and writers around `fantasy_core`:
//! roster JSON → Roster, rate-stat CSV → PlayerStatsTable,
//! Summary → percentile CSV / summary JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use fantasy_core::api::{roster_from_teams, TeamData};
use fantasy_core::tennis::{Matchup, PlayerStatsRecord};
use fantasy_core::{PlayerStatsTable, Roster, SimConfig, Summary};

/// Roster file layout: either `{"teams": [...]}` or a bare list of teams.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RosterFile {
    Wrapped { teams: Vec<TeamData> },
    Bare(Vec<TeamData>),
}

impl RosterFile {
    fn into_teams(self) -> Vec<TeamData> {
        match self {
            RosterFile::Wrapped { teams } | RosterFile::Bare(teams) => teams,
        }
    }
}

/// Load a team-nested roster JSON file and validate it against `config`.
pub fn load_roster(path: &Path, config: &SimConfig) -> Result<Roster> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file: {}", path.display()))?;
    let file: RosterFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse roster JSON: {}", path.display()))?;

    let roster = roster_from_teams(file.into_teams(), config)
        .with_context(|| format!("Invalid roster: {}", path.display()))?;
    info!(
        groups = roster.groups().len(),
        entities = roster.entities().len(),
        "roster loaded"
    );
    Ok(roster)
}

/// Load a PascalCase rate-stat CSV. Rows that fail to deserialize are
/// counted and skipped; range validation happens later, per lookup.
pub fn load_player_stats_csv(path: &Path) -> Result<PlayerStatsTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let mut records = Vec::new();
    let mut failed = 0usize;
    for (row, result) in reader.deserialize::<PlayerStatsRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                failed += 1;
                warn!(row = row + 2, error = %e, "unreadable stats row skipped");
            }
        }
    }

    let table = PlayerStatsTable::from_records(records);
    info!(rows = table.len(), failed, "player stats loaded");
    Ok(table)
}

/// Load a `player1,player2,surface` CSV of pairings.
pub fn load_matchups_csv(path: &Path) -> Result<Vec<Matchup>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    reader
        .deserialize::<MatchupRow>()
        .enumerate()
        .map(|(row, result)| {
            let raw = result.with_context(|| format!("Bad matchup row {}", row + 2))?;
            let surface = raw
                .surface
                .parse()
                .with_context(|| format!("Bad surface on matchup row {}", row + 2))?;
            Ok(Matchup::new(raw.player1, raw.player2, surface))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct MatchupRow {
    player1: String,
    player2: String,
    surface: String,
}

/// One row of the percentile CSV.
#[derive(Debug, Serialize)]
struct PercentileRow<'a> {
    kind: &'static str,
    id: &'a str,
    mean: f64,
    p25: f64,
    p50: f64,
    p75: f64,
    p85: f64,
    p95: f64,
    p99: f64,
    samples: usize,
}

/// Write one row per summarized team, player and stack.
pub fn write_percentiles_csv(path: &Path, summary: &Summary) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    let sections = [
        ("team", &summary.groups),
        ("player", &summary.entities),
        ("stack", &summary.stacks),
    ];
    for (kind, outcomes) in sections {
        for (id, outcome) in outcomes {
            let p = &outcome.percentiles;
            writer.serialize(PercentileRow {
                kind,
                id,
                mean: outcome.mean,
                p25: p.p25,
                p50: p.p50,
                p75: p.p75,
                p85: p.p85,
                p95: p.p95,
                p99: p.p99,
                samples: outcome.samples,
            })?;
        }
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(())
}

/// Pretty-print any serializable result to `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
