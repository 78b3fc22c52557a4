//! # fantasy_core - Monte Carlo Fantasy Outcome Simulator
//!
//! Estimates fantasy-sports outcome distributions by simulation.
//!
//! ## Features
//! - Correlated slate simulation: log-normal team totals, normal player
//!   outcomes, a driver shock propagated to teammates by usage share
//! - Percentiles, means, Pearson correlations and alignment histograms
//! - Game-by-game tennis match simulation with tie-breaks and fantasy scoring
//! - Seeded, reproducible runs (sequential or rayon-parallel)
//! - JSON API for callers outside Rust

// Loop style - indices mirror the matrix layout
#![allow(clippy::needless_range_loop)]
// Batch outcomes pair inputs with per-item results
#![allow(clippy::type_complexity)]

pub mod analysis;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod tennis;

// Re-export main API functions
pub use api::{simulate_slate_json, simulate_tennis_json, SlateRequest, TennisRequest};
pub use error::{Result, SimError};

pub use analysis::{adjust_percentiles, PercentileSet, Summarizer, Summary};
pub use config::{SimConfig, TennisConfig};
pub use engine::{SimObserver, SimulationOutput, SimulationRunner, TrialMatrix};
pub use models::{EntityRecord, GroupRecord, Roster};
pub use tennis::{
    fantasy_points, run_matchups, FantasyStatLine, MatchBatch, MatchFormat, MatchResult,
    MatchSimulator, PlayerStatsTable, Surface,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn slate_request(seed: u64) -> Value {
        json!({
            "schema_version": 1,
            "seed": seed,
            "num_simulations": 2000,
            "teams": [
                {
                    "name": "Team_A",
                    "implied_total": 24.0,
                    "players": [
                        {"id": "QB_Team_A", "position": "QB", "base_projection": 20.0},
                        {"id": "WR1_Team_A", "position": "WR1", "base_projection": 18.0},
                        {"id": "WR2_Team_A", "position": "WR2", "base_projection": 15.0},
                        {"id": "WR3_Team_A", "position": "WR3", "base_projection": 12.0},
                        {"id": "TE_Team_A", "position": "TE", "base_projection": 10.0},
                        {"id": "RB_Team_A", "position": "RB", "base_projection": 16.0},
                        {"id": "DST_Team_A", "position": "DST", "base_projection": 8.0}
                    ]
                },
                {"name": "Team_B", "implied_total": 20.5}
            ],
            "correlation_pairs": [["WR1_Team_A", "QB_Team_A"]]
        })
    }

    fn strip_run_metadata(json: &str) -> Value {
        let mut value: Value = serde_json::from_str(json).unwrap();
        let obj = value.as_object_mut().unwrap();
        assert!(obj.remove("run_id").is_some());
        assert!(obj.remove("generated_at").is_some());
        value
    }

    fn stats_row(player: &str, first_serve_won: f64) -> Value {
        json!({
            "Player": player, "Surface": "Hard", "League": "ATP",
            "FirstServePercentage": 0.62, "AcePercentage": 0.08,
            "FirstServeWonPercentage": first_serve_won, "SecondServeWonPercentage": 0.53,
            "DoubleFaultPercentage": 0.03, "ServiceGamesWonPercentage": 0.84,
            "ReturnGamesWonPercentage": 0.22, "PointsWonPercentage": 0.51,
            "GamesWonPercentage": 0.53, "SetsWonPercentage": 0.58,
            "TieBreaksWonPercentage": 0.55, "BreakPointsSavedPercentage": 0.63,
            "BreakPointsConvertedPercentage": 0.41, "FirstServeReturnPointsWonPercentage": 0.29,
            "SecondServeReturnPointsWonPercentage": 0.50, "ReturnPointsWonPercentage": 0.38,
            "ServicePointsWonPercentage": 0.66, "BreakPointsFacedPerServiceGame": 0.45,
            "AceAgainstPercentage": 0.06, "AcesAgainstPerReturnGame": 0.42,
            "BreakPointChancesPerReturnGame": 0.62
        })
    }

    fn tennis_request(seed: u64) -> Value {
        json!({
            "schema_version": 1,
            "seed": seed,
            "best_of": 3,
            "num_matches": 300,
            "surface": "hard",
            "player1": "Server One",
            "player2": "Server Two",
            "stats": [stats_row("Server One", 0.76), stats_row("Server Two", 0.70)]
        })
    }

    #[test]
    fn test_slate_simulation() {
        let result = simulate_slate_json(&slate_request(42).to_string());
        assert!(result.is_ok(), "Simulation should succeed: {result:?}");

        let parsed: Value = serde_json::from_str(&result.unwrap()).unwrap();
        assert_eq!(parsed["schema_version"], 1);
        assert_eq!(parsed["total_trials"], 2000);
        assert!(parsed["player_summaries"]["QB_Team_A"]["percentiles"]["99th"].is_number());
        assert!(parsed["team_scores"]["Team_B"]["mean"].is_number());
        assert_eq!(parsed["alignment"][0]["buckets"][0]["label"], "all_five");
        assert!(parsed["correlations"][0]["correlation"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_slate_determinism() {
        let request = slate_request(12345).to_string();
        let a = strip_run_metadata(&simulate_slate_json(&request).unwrap());
        let b = strip_run_metadata(&simulate_slate_json(&request).unwrap());
        assert_eq!(a, b, "Same seed should produce identical results");

        let c = strip_run_metadata(&simulate_slate_json(&slate_request(54321).to_string()).unwrap());
        assert_ne!(a, c);
    }

    #[test]
    fn test_tennis_determinism() {
        let request = tennis_request(7).to_string();
        let a = strip_run_metadata(&simulate_tennis_json(&request).unwrap());
        let b = strip_run_metadata(&simulate_tennis_json(&request).unwrap());
        assert_eq!(a, b);
        assert_eq!(a["matches"], 300);
        assert_eq!(a["surface"], "Hard");
        let p1 = a["player1_win_probability"].as_f64().unwrap();
        let p2 = a["player2_win_probability"].as_f64().unwrap();
        assert!((p1 + p2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_schema_version_mismatch() {
        let mut request = slate_request(1);
        request["schema_version"] = json!(2);
        let err = simulate_slate_json(&request.to_string()).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter(_)));

        let mut request = tennis_request(1);
        request["schema_version"] = json!(9);
        assert!(simulate_tennis_json(&request.to_string()).is_err());
    }

    #[test]
    fn test_empty_slate_is_not_an_error() {
        let request = json!({"schema_version": 1, "seed": 3, "teams": []});
        let parsed: Value =
            serde_json::from_str(&simulate_slate_json(&request.to_string()).unwrap()).unwrap();
        assert_eq!(parsed["total_trials"], 0);
        assert!(parsed["player_summaries"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_missing_tennis_player() {
        let mut request = tennis_request(1);
        request["player2"] = json!("Unknown");
        let err = simulate_tennis_json(&request.to_string()).unwrap_err();
        assert!(matches!(err, SimError::MissingEntityData { .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(simulate_slate_json("{"), Err(SimError::Serialization(_))));
    }
}
