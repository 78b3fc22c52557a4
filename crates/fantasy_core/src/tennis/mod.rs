//! Tennis match simulation: rate statistics, the match state machine,
//! fantasy scoring and repeated-match batches.

pub mod batch;
pub mod elo;
pub mod format;
pub mod scoring;
pub mod simulator;
pub mod state;
pub mod stats;

pub use batch::{run_matchups, MatchBatch, MatchDistribution, Matchup};
pub use elo::{elo_win_probability, EloComparison, SurfaceElo};
pub use format::MatchFormat;
pub use scoring::{fantasy_points, FantasyStatLine, ScoringTable};
pub use simulator::{game_win_probability, tiebreak_server, MatchResult, MatchSimulator};
pub use state::{MatchPhase, MatchState, PlayerTally, SetResult, Side, Step};
pub use stats::{
    normalize_player_name, PlayerRateStats, PlayerStatsRecord, PlayerStatsTable, Surface,
};
