//! # Match Simulator
//!
//! Plays a match game by game into a `MatchState`.
//!
//! A regular game is one Bernoulli draw with
//! `P(server) = s / (s + r)`, where `s = first_serve_won * service_games_won`
//! of the server and `r = return_points_won * games_won` of the returner
//! (0.5 when both are zero). Ace and double-fault counts per service game are
//! binomial over `serves_per_game`. Tie-breaks are played point by point with
//! the same ratio, first server on point one, then two points each.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::format::MatchFormat;
use super::scoring::FantasyStatLine;
use super::state::{tiebreak_decided, MatchState, SetResult, Side};
use super::stats::PlayerRateStats;
use crate::engine::{ServeEventSampler, ServeEvents};
use crate::error::{Result, SimError};

pub const DEFAULT_SERVES_PER_GAME: u64 = 8;

/// Probability that `server` wins a game (or tie-break point) against `returner`.
pub fn game_win_probability(server: &PlayerRateStats, returner: &PlayerRateStats) -> f64 {
    let server_effect = server.first_serve_won * server.service_games_won;
    let returner_effect = returner.return_points_won * returner.games_won;
    let total = server_effect + returner_effect;
    if total == 0.0 {
        0.5
    } else {
        server_effect / total
    }
}

/// Server of tie-break point `k` (zero-based).
pub fn tiebreak_server(first_server: Side, point: u32) -> Side {
    if ((point + 1) / 2) % 2 == 0 {
        first_server
    } else {
        first_server.opponent()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: Side,
    pub format: MatchFormat,
    pub sets: Vec<SetResult>,
    pub player1: FantasyStatLine,
    pub player2: FantasyStatLine,
    pub player1_fantasy_points: f64,
    pub player2_fantasy_points: f64,
    /// Wall-clock seconds spent simulating
    pub duration: f64,
}

impl MatchResult {
    pub fn stat_line(&self, side: Side) -> &FantasyStatLine {
        match side {
            Side::Player1 => &self.player1,
            Side::Player2 => &self.player2,
        }
    }

    pub fn fantasy_points(&self, side: Side) -> f64 {
        match side {
            Side::Player1 => self.player1_fantasy_points,
            Side::Player2 => self.player2_fantasy_points,
        }
    }

    pub fn total_games(&self) -> u32 {
        self.sets.iter().map(|s| s.score[0] + s.score[1]).sum()
    }

    pub fn tiebreaks(&self) -> usize {
        self.sets.iter().filter(|s| s.tiebreak.is_some()).count()
    }

    pub fn straight_sets(&self) -> bool {
        self.sets.iter().all(|s| s.winner == self.winner)
    }
}

#[derive(Debug, Clone)]
pub struct MatchSimulator {
    players: [PlayerRateStats; 2],
    format: MatchFormat,
    /// Chance that player i holds serve
    hold: [f64; 2],
    serve: [ServeEventSampler; 2],
}

impl MatchSimulator {
    pub fn new(
        player1: PlayerRateStats,
        player2: PlayerRateStats,
        format: MatchFormat,
        serves_per_game: u64,
    ) -> Result<Self> {
        let hold = [
            game_win_probability(&player1, &player2),
            game_win_probability(&player2, &player1),
        ];
        // With both holds fixed at 0 or 1 the serve rotation keeps a
        // tie-break level forever.
        if hold[0] == hold[1] && (hold[0] == 0.0 || hold[0] == 1.0) {
            return Err(SimError::invalid(format!(
                "{} and {} both hold serve with probability {}; tie-breaks cannot finish",
                player1.player, player2.player, hold[0]
            )));
        }
        let serve = [
            ServeEventSampler::new(serves_per_game, player1.ace, player1.double_fault)?,
            ServeEventSampler::new(serves_per_game, player2.ace, player2.double_fault)?,
        ];
        Ok(Self { players: [player1, player2], format, hold, serve })
    }

    pub fn format(&self) -> MatchFormat {
        self.format
    }

    pub fn player(&self, side: Side) -> &PlayerRateStats {
        &self.players[side.index()]
    }

    pub fn hold_probability(&self, server: Side) -> f64 {
        self.hold[server.index()]
    }

    /// Winner of one service game and the server's serve events.
    pub fn simulate_game<R: Rng + ?Sized>(&self, server: Side, rng: &mut R) -> (Side, ServeEvents) {
        let winner = if rng.gen::<f64>() < self.hold[server.index()] {
            server
        } else {
            server.opponent()
        };
        (winner, self.serve[server.index()].sample(rng))
    }

    /// Winner and final points (player 1 first) of a tie-break.
    pub fn simulate_tiebreak<R: Rng + ?Sized>(&self, first_server: Side, rng: &mut R) -> (Side, [u32; 2]) {
        let mut points = [0u32; 2];
        let mut played = 0;
        while !tiebreak_decided(points) {
            let server = tiebreak_server(first_server, played);
            let winner = if rng.gen::<f64>() < self.hold[server.index()] {
                server
            } else {
                server.opponent()
            };
            points[winner.index()] += 1;
            played += 1;
        }
        let winner = if points[0] > points[1] { Side::Player1 } else { Side::Player2 };
        (winner, points)
    }

    /// Play a full match with `first_server` serving the first game.
    pub fn simulate_match<R: Rng + ?Sized>(&self, first_server: Side, rng: &mut R) -> Result<MatchResult> {
        let started = Instant::now();
        let mut state = MatchState::new(self.format, first_server);

        while !state.is_complete() {
            if state.tiebreak_due() {
                let (winner, points) = self.simulate_tiebreak(state.server(), rng);
                state.record_tiebreak(winner, points)?;
            } else {
                let (winner, events) = self.simulate_game(state.server(), rng);
                state.record_game(winner, events)?;
            }
        }

        let finished = state.into_result()?;
        let [player1, player2] = finished.lines;
        Ok(MatchResult {
            winner: finished.winner,
            format: finished.format,
            sets: finished.sets,
            player1_fantasy_points: player1.points(),
            player2_fantasy_points: player2.points(),
            player1,
            player2,
            duration: started.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tennis::stats::sample_record;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn player(name: &str) -> PlayerRateStats {
        PlayerRateStats::try_from(sample_record(name, "Hard")).unwrap()
    }

    fn simulator(format: MatchFormat) -> MatchSimulator {
        let mut p2 = player("Challenger");
        p2.first_serve_won = 0.68;
        p2.return_points_won = 0.35;
        MatchSimulator::new(player("Favorite"), p2, format, DEFAULT_SERVES_PER_GAME).unwrap()
    }

    fn set_is_valid(set: &SetResult) -> bool {
        let [a, b] = set.score;
        let (hi, lo) = (a.max(b), a.min(b));
        let winner_games = set.score[set.winner.index()];
        let by_games = hi >= 6 && hi - lo >= 2 && set.tiebreak.is_none();
        let by_tiebreak = set.score.contains(&7)
            && hi == 7
            && lo == 6
            && set.tiebreak.is_some_and(|p| {
                tiebreak_decided(p) && p[set.winner.index()] > p[set.winner.opponent().index()]
            });
        winner_games == hi && (by_games || by_tiebreak)
    }

    #[test]
    fn test_game_probability_model() {
        let server = player("S");
        let returner = player("R");
        let s = 0.74 * 0.84;
        let r = 0.38 * 0.53;
        assert!((game_win_probability(&server, &returner) - s / (s + r)).abs() < 1e-12);

        let mut zero = player("Z");
        zero.first_serve_won = 0.0;
        zero.return_points_won = 0.0;
        assert_eq!(game_win_probability(&zero, &zero), 0.5);
    }

    #[test]
    fn test_tiebreak_rotation() {
        let order: Vec<Side> = (0..7).map(|k| tiebreak_server(Side::Player1, k)).collect();
        use Side::{Player1 as A, Player2 as B};
        assert_eq!(order, vec![A, B, B, A, A, B, B]);
    }

    #[test]
    fn test_every_set_result_is_legal() {
        let sim = simulator(MatchFormat::BestOf3);
        let mut rng = ChaCha8Rng::seed_from_u64(10_000);
        let mut tiebreaks = 0;
        for _ in 0..10_000 {
            let result = sim.simulate_match(Side::Player1, &mut rng).unwrap();
            tiebreaks += result.tiebreaks();

            let sets_won = result.sets.iter().filter(|s| s.winner == result.winner).count();
            assert_eq!(sets_won, 2);
            assert!(result.sets.len() <= 3);
            for set in &result.sets {
                assert!(set_is_valid(set), "illegal set {set:?}");
                assert_eq!(set.games.len() as u32, set.score[0] + set.score[1]);
            }
        }
        assert!(tiebreaks > 0);
    }

    #[test]
    fn test_best_of_five_needs_three_sets() {
        let sim = simulator(MatchFormat::BestOf5);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            let result = sim.simulate_match(Side::Player2, &mut rng).unwrap();
            let line = result.stat_line(result.winner);
            assert_eq!(line.sets_won, 3);
            assert!((3..=5).contains(&result.sets.len()));
            assert_eq!(line.straight_sets, result.straight_sets());
        }
    }

    #[test]
    fn test_stat_lines_are_consistent() {
        let sim = simulator(MatchFormat::BestOf3);
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        for _ in 0..1_000 {
            let r = sim.simulate_match(Side::Player1, &mut rng).unwrap();
            assert_eq!(r.player1.games_won, r.player2.games_lost);
            assert_eq!(r.player1.sets_won, r.player2.sets_lost);
            assert_eq!(r.player1.games_won + r.player2.games_won, r.total_games());
            assert!(r.player1.match_won ^ r.player2.match_won);
            assert_eq!(r.player1_fantasy_points, r.player1.points());
            for line in [&r.player1, &r.player2] {
                assert_eq!(line.no_double_fault, line.double_faults == 0);
                assert_eq!(line.ten_plus_aces, line.aces >= 10);
                assert_eq!(line.fifteen_plus_aces, line.aces >= 15);
                assert!(line.breaks <= line.games_won);
            }
        }
    }

    #[test]
    fn test_same_seed_same_match() {
        let sim = simulator(MatchFormat::BestOf3);
        let a = sim.simulate_match(Side::Player1, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        let b = sim.simulate_match(Side::Player1, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        assert_eq!(a.sets, b.sets);
        assert_eq!(a.player1, b.player1);
        assert_eq!(a.player2_fantasy_points, b.player2_fantasy_points);
    }

    #[test]
    fn test_undecidable_tiebreak_is_rejected() {
        let mut p1 = player("Wall");
        p1.return_points_won = 0.0;
        let mut p2 = player("Wall Two");
        p2.return_points_won = 0.0;
        let err = MatchSimulator::new(p1, p2, MatchFormat::BestOf3, 8).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter(_)));
    }
}
