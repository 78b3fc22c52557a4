use serde::{Deserialize, Serialize};

use super::batch::MatchDistribution;
use super::stats::Surface;

/// Rating-implied chance that `player` beats `opponent`.
pub fn elo_win_probability(player: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - player) / 400.0))
}

/// Per-surface Elo ratings for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceElo {
    pub player: String,
    pub hard: Option<f64>,
    pub clay: Option<f64>,
    pub grass: Option<f64>,
}

impl SurfaceElo {
    /// `None` for `Surface::All` or when no rating exists for the surface.
    pub fn rating(&self, surface: Surface) -> Option<f64> {
        match surface {
            Surface::Hard => self.hard,
            Surface::Clay => self.clay,
            Surface::Grass => self.grass,
            Surface::All => None,
        }
    }
}

/// Simulated win rate next to the rating-implied one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloComparison {
    pub simulated: f64,
    pub elo: f64,
    /// `simulated - elo`, from player 1's side
    pub edge: f64,
}

impl EloComparison {
    pub fn new(distribution: &MatchDistribution, player1_elo: f64, player2_elo: f64) -> Self {
        let simulated = distribution.player1_win_probability;
        let elo = elo_win_probability(player1_elo, player2_elo);
        Self { simulated, elo, edge: simulated - elo }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elo_probability() {
        assert!((elo_win_probability(1500.0, 1500.0) - 0.5).abs() < 1e-12);
        let p = elo_win_probability(1900.0, 1500.0);
        assert!((p - 1.0 / 1.1).abs() < 1e-12);
        assert!((p + elo_win_probability(1500.0, 1900.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_surface_rating() {
        let elo = SurfaceElo { player: "x".into(), hard: Some(2000.0), clay: None, grass: Some(1800.0) };
        assert_eq!(elo.rating(Surface::Hard), Some(2000.0));
        assert_eq!(elo.rating(Surface::Clay), None);
        assert_eq!(elo.rating(Surface::All), None);
    }

    #[test]
    fn test_comparison_edge() {
        let dist = MatchDistribution { player1_win_probability: 0.7, ..Default::default() };
        let cmp = EloComparison::new(&dist, 1600.0, 1600.0);
        assert!((cmp.edge - 0.2).abs() < 1e-12);
    }
}
