//! # Player Rate Statistics
//!
//! `PlayerStatsRecord` is the loosely-typed row as it arrives from a CSV or
//! JSON source (every column optional). `PlayerRateStats` is the validated
//! form the simulator consumes; conversion fails fast with
//! `SimError::InvalidPlayerStats` naming the player and the offending column.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Surface {
    Hard,
    Clay,
    Grass,
    All,
}

impl Surface {
    pub fn as_str(self) -> &'static str {
        match self {
            Surface::Hard => "Hard",
            Surface::Clay => "Clay",
            Surface::Grass => "Grass",
            Surface::All => "All",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Surface {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(Surface::Hard),
            "clay" => Ok(Surface::Clay),
            "grass" => Ok(Surface::Grass),
            "all" => Ok(Surface::All),
            other => Err(SimError::invalid(format!("unknown surface '{other}'"))),
        }
    }
}

/// Lookup key for player names: non-breaking spaces folded, trimmed, lowercase.
pub fn normalize_player_name(name: &str) -> String {
    name.replace('\u{a0}', " ").trim().to_lowercase()
}

/// One (player, surface) row of rate statistics, unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayerStatsRecord {
    pub player: Option<String>,
    pub surface: Option<String>,
    pub league: Option<String>,
    pub first_serve_percentage: Option<f64>,
    pub ace_percentage: Option<f64>,
    pub first_serve_won_percentage: Option<f64>,
    pub second_serve_won_percentage: Option<f64>,
    pub double_fault_percentage: Option<f64>,
    pub service_games_won_percentage: Option<f64>,
    pub return_games_won_percentage: Option<f64>,
    pub points_won_percentage: Option<f64>,
    pub games_won_percentage: Option<f64>,
    pub sets_won_percentage: Option<f64>,
    pub tie_breaks_won_percentage: Option<f64>,
    pub break_points_saved_percentage: Option<f64>,
    pub break_points_converted_percentage: Option<f64>,
    pub first_serve_return_points_won_percentage: Option<f64>,
    pub second_serve_return_points_won_percentage: Option<f64>,
    pub return_points_won_percentage: Option<f64>,
    pub service_points_won_percentage: Option<f64>,
    pub break_points_faced_per_service_game: Option<f64>,
    pub ace_against_percentage: Option<f64>,
    pub aces_against_per_return_game: Option<f64>,
    pub break_point_chances_per_return_game: Option<f64>,
}

/// Validated rate statistics for one player on one surface.
///
/// Percentages lie in [0, 1]; the three per-game averages are finite and
/// non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRateStats {
    pub player: String,
    pub surface: Surface,
    pub league: String,
    pub first_serve: f64,
    pub ace: f64,
    pub first_serve_won: f64,
    pub second_serve_won: f64,
    pub double_fault: f64,
    pub service_games_won: f64,
    pub return_games_won: f64,
    pub points_won: f64,
    pub games_won: f64,
    pub sets_won: f64,
    pub tie_breaks_won: f64,
    pub break_points_saved: f64,
    pub break_points_converted: f64,
    pub first_serve_return_points_won: f64,
    pub second_serve_return_points_won: f64,
    pub return_points_won: f64,
    pub service_points_won: f64,
    pub break_points_faced_per_service_game: f64,
    pub ace_against: f64,
    pub aces_against_per_return_game: f64,
    pub break_point_chances_per_return_game: f64,
}

struct FieldCheck<'a> {
    player: &'a str,
}

impl FieldCheck<'_> {
    fn error(&self, field: &str, reason: impl Into<String>) -> SimError {
        SimError::InvalidPlayerStats {
            player: self.player.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    fn rate(&self, field: &str, value: Option<f64>) -> Result<f64> {
        let value = value.ok_or_else(|| self.error(field, "missing"))?;
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(self.error(field, format!("{value} is outside [0, 1]")))
        }
    }

    fn per_game(&self, field: &str, value: Option<f64>) -> Result<f64> {
        let value = value.ok_or_else(|| self.error(field, "missing"))?;
        if value >= 0.0 && value.is_finite() {
            Ok(value)
        } else {
            Err(self.error(field, format!("{value} must be a finite non-negative average")))
        }
    }

    fn text(&self, field: &str, value: Option<String>) -> Result<String> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(self.error(field, "missing")),
        }
    }
}

impl TryFrom<PlayerStatsRecord> for PlayerRateStats {
    type Error = SimError;

    fn try_from(r: PlayerStatsRecord) -> Result<Self> {
        let name = r.player.clone().unwrap_or_default();
        let check = FieldCheck { player: name.trim() };

        let player = check.text("Player", r.player)?;
        let surface_text = check.text("Surface", r.surface)?;
        let surface = surface_text
            .parse::<Surface>()
            .map_err(|_| check.error("Surface", format!("unknown surface '{surface_text}'")))?;

        Ok(Self {
            league: check.text("League", r.league)?,
            first_serve: check.rate("FirstServePercentage", r.first_serve_percentage)?,
            ace: check.rate("AcePercentage", r.ace_percentage)?,
            first_serve_won: check.rate("FirstServeWonPercentage", r.first_serve_won_percentage)?,
            second_serve_won: check
                .rate("SecondServeWonPercentage", r.second_serve_won_percentage)?,
            double_fault: check.rate("DoubleFaultPercentage", r.double_fault_percentage)?,
            service_games_won: check
                .rate("ServiceGamesWonPercentage", r.service_games_won_percentage)?,
            return_games_won: check
                .rate("ReturnGamesWonPercentage", r.return_games_won_percentage)?,
            points_won: check.rate("PointsWonPercentage", r.points_won_percentage)?,
            games_won: check.rate("GamesWonPercentage", r.games_won_percentage)?,
            sets_won: check.rate("SetsWonPercentage", r.sets_won_percentage)?,
            tie_breaks_won: check.rate("TieBreaksWonPercentage", r.tie_breaks_won_percentage)?,
            break_points_saved: check
                .rate("BreakPointsSavedPercentage", r.break_points_saved_percentage)?,
            break_points_converted: check
                .rate("BreakPointsConvertedPercentage", r.break_points_converted_percentage)?,
            first_serve_return_points_won: check.rate(
                "FirstServeReturnPointsWonPercentage",
                r.first_serve_return_points_won_percentage,
            )?,
            second_serve_return_points_won: check.rate(
                "SecondServeReturnPointsWonPercentage",
                r.second_serve_return_points_won_percentage,
            )?,
            return_points_won: check
                .rate("ReturnPointsWonPercentage", r.return_points_won_percentage)?,
            service_points_won: check
                .rate("ServicePointsWonPercentage", r.service_points_won_percentage)?,
            break_points_faced_per_service_game: check.per_game(
                "BreakPointsFacedPerServiceGame",
                r.break_points_faced_per_service_game,
            )?,
            ace_against: check.rate("AceAgainstPercentage", r.ace_against_percentage)?,
            aces_against_per_return_game: check
                .per_game("AcesAgainstPerReturnGame", r.aces_against_per_return_game)?,
            break_point_chances_per_return_game: check.per_game(
                "BreakPointChancesPerReturnGame",
                r.break_point_chances_per_return_game,
            )?,
            player,
            surface,
        })
    }
}

/// Rate-stat rows keyed by normalized player name and surface.
///
/// Rows are stored as received and validated on `require`, so one bad row
/// only fails the matchups that need it.
#[derive(Debug, Clone, Default)]
pub struct PlayerStatsTable {
    rows: HashMap<(String, Surface), PlayerStatsRecord>,
}

impl PlayerStatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw rows. Rows without a usable player or surface are
    /// skipped with a warning; the first row for a (player, surface) wins.
    pub fn from_records(records: impl IntoIterator<Item = PlayerStatsRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            if let Err(e) = table.insert(record) {
                warn!(error = %e, "skipping player stats row");
            }
        }
        table
    }

    pub fn insert(&mut self, record: PlayerStatsRecord) -> Result<()> {
        let player = record.player.as_deref().map(normalize_player_name).unwrap_or_default();
        if player.is_empty() {
            return Err(SimError::InvalidPlayerStats {
                player: String::new(),
                field: "Player".to_string(),
                reason: "missing".to_string(),
            });
        }
        let surface: Surface = record
            .surface
            .as_deref()
            .ok_or_else(|| SimError::InvalidPlayerStats {
                player: player.clone(),
                field: "Surface".to_string(),
                reason: "missing".to_string(),
            })?
            .parse()
            .map_err(|e: SimError| SimError::InvalidPlayerStats {
                player: player.clone(),
                field: "Surface".to_string(),
                reason: e.to_string(),
            })?;

        self.rows.entry((player, surface)).or_insert(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for the player on `surface`, falling back to their `All` row.
    pub fn find(&self, player: &str, surface: Surface) -> Option<&PlayerStatsRecord> {
        let name = normalize_player_name(player);
        self.rows
            .get(&(name.clone(), surface))
            .or_else(|| self.rows.get(&(name, Surface::All)))
    }

    /// Validated statistics, or `MissingEntityData` when no row matches.
    pub fn require(&self, player: &str, surface: Surface) -> Result<PlayerRateStats> {
        match self.find(player, surface) {
            Some(record) => PlayerRateStats::try_from(record.clone()),
            None => {
                warn!(player, surface = %surface, "no statistics for player");
                Err(SimError::MissingEntityData {
                    player: player.to_string(),
                    surface: surface.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record(player: &str, surface: &str) -> PlayerStatsRecord {
    PlayerStatsRecord {
        player: Some(player.to_string()),
        surface: Some(surface.to_string()),
        league: Some("ATP".to_string()),
        first_serve_percentage: Some(0.62),
        ace_percentage: Some(0.08),
        first_serve_won_percentage: Some(0.74),
        second_serve_won_percentage: Some(0.53),
        double_fault_percentage: Some(0.03),
        service_games_won_percentage: Some(0.84),
        return_games_won_percentage: Some(0.22),
        points_won_percentage: Some(0.51),
        games_won_percentage: Some(0.53),
        sets_won_percentage: Some(0.58),
        tie_breaks_won_percentage: Some(0.55),
        break_points_saved_percentage: Some(0.63),
        break_points_converted_percentage: Some(0.41),
        first_serve_return_points_won_percentage: Some(0.29),
        second_serve_return_points_won_percentage: Some(0.50),
        return_points_won_percentage: Some(0.38),
        service_points_won_percentage: Some(0.66),
        break_points_faced_per_service_game: Some(0.45),
        ace_against_percentage: Some(0.06),
        aces_against_per_return_game: Some(0.42),
        break_point_chances_per_return_game: Some(0.62),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_record_converts() {
        let stats = PlayerRateStats::try_from(sample_record("Jannik Sinner", "hard")).unwrap();
        assert_eq!(stats.player, "Jannik Sinner");
        assert_eq!(stats.surface, Surface::Hard);
        assert_eq!(stats.first_serve_won, 0.74);
    }

    #[test]
    fn test_out_of_range_rate_is_rejected() {
        for bad in [1.5, -0.1] {
            let mut record = sample_record("Casper Ruud", "Clay");
            record.ace_percentage = Some(bad);
            match PlayerRateStats::try_from(record) {
                Err(SimError::InvalidPlayerStats { player, field, .. }) => {
                    assert_eq!(player, "Casper Ruud");
                    assert_eq!(field, "AcePercentage");
                }
                other => panic!("expected InvalidPlayerStats, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let mut record = sample_record("Casper Ruud", "Clay");
        record.return_points_won_percentage = None;
        let err = PlayerRateStats::try_from(record).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidPlayerStats { ref field, .. } if field == "ReturnPointsWonPercentage"
        ));

        let mut record = sample_record("Casper Ruud", "Clay");
        record.league = None;
        assert!(PlayerRateStats::try_from(record).is_err());
    }

    #[test]
    fn test_per_game_averages_may_exceed_one() {
        let mut record = sample_record("Big Server", "Grass");
        record.aces_against_per_return_game = Some(1.8);
        assert!(PlayerRateStats::try_from(record.clone()).is_ok());

        record.break_points_faced_per_service_game = Some(-0.2);
        assert!(PlayerRateStats::try_from(record).is_err());
    }

    #[test]
    fn test_pascal_case_columns_deserialize() {
        let json = r#"{"Player": "A", "Surface": "Clay", "AcePercentage": 0.1}"#;
        let record: PlayerStatsRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.ace_percentage, Some(0.1));
        assert_eq!(record.league, None);
    }

    #[test]
    fn test_table_surface_fallback() {
        let table = PlayerStatsTable::from_records(vec![
            sample_record("Iga Swiatek", "Clay"),
            sample_record("Iga Swiatek", "All"),
        ]);

        assert_eq!(table.len(), 2);
        let clay = table.find("IGA SWIATEK", Surface::Clay).unwrap();
        assert_eq!(clay.surface.as_deref(), Some("Clay"));
        let grass = table.find("iga swiatek", Surface::Grass).unwrap();
        assert_eq!(grass.surface.as_deref(), Some("All"));
    }

    #[test]
    fn test_table_missing_player() {
        let table = PlayerStatsTable::from_records(vec![sample_record("A", "Hard")]);
        assert!(table.find("B", Surface::Hard).is_none());
        let err = table.require("B", Surface::Hard).unwrap_err();
        assert!(matches!(err, SimError::MissingEntityData { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_table_skips_keyless_rows() {
        let mut nameless = sample_record("", "Hard");
        nameless.player = None;
        let table = PlayerStatsTable::from_records(vec![nameless, sample_record("A", "Dirt")]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_normalize_player_name() {
        assert_eq!(normalize_player_name("  Novak\u{a0}Djokovic "), "novak djokovic");
    }
}
