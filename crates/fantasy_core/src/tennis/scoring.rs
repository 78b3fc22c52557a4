//! # Fantasy Scoring
//!
//! Maps a finished player stat line to a fantasy point total. Every scored
//! item is a named field of `FantasyStatLine`, and the point values come from
//! a fixed per-format `ScoringTable`.
//!
//! | Item            | Best of 3 | Best of 5 |
//! |-----------------|-----------|-----------|
//! | Match played    | +30       | +30       |
//! | Walkover        | +30       | +30       |
//! | Match won       | +6        | +5        |
//! | Game won        | +2.5      | +2        |
//! | Game lost       | -2        | -1.6      |
//! | Set won         | +6        | +5        |
//! | Set lost        | -3        | -2.5      |
//! | Ace             | +0.4      | +0.25     |
//! | Double fault    | -1        | -1        |
//! | Break           | +0.75     | +0.5      |
//! | Clean set       | +4        | +2.5      |
//! | Straight sets   | +6        | +5        |
//! | No double fault | +2.5      | +5        |
//! | 10+ aces        | +2        | +2        |
//! | 15+ aces        | +2        | +2        |

use serde::{Deserialize, Serialize};

use super::format::MatchFormat;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringTable {
    pub match_played: f64,
    pub walkover: f64,
    pub match_won: f64,
    pub game_won: f64,
    pub game_lost: f64,
    pub set_won: f64,
    pub set_lost: f64,
    pub ace: f64,
    pub double_fault: f64,
    pub break_won: f64,
    pub clean_set: f64,
    pub straight_sets: f64,
    pub no_double_fault: f64,
    pub ten_plus_aces: f64,
    pub fifteen_plus_aces: f64,
}

impl ScoringTable {
    pub const BEST_OF_3: ScoringTable = ScoringTable {
        match_played: 30.0,
        walkover: 30.0,
        match_won: 6.0,
        game_won: 2.5,
        game_lost: -2.0,
        set_won: 6.0,
        set_lost: -3.0,
        ace: 0.4,
        double_fault: -1.0,
        break_won: 0.75,
        clean_set: 4.0,
        straight_sets: 6.0,
        no_double_fault: 2.5,
        ten_plus_aces: 2.0,
        fifteen_plus_aces: 2.0,
    };

    pub const BEST_OF_5: ScoringTable = ScoringTable {
        match_played: 30.0,
        walkover: 30.0,
        match_won: 5.0,
        game_won: 2.0,
        game_lost: -1.6,
        set_won: 5.0,
        set_lost: -2.5,
        ace: 0.25,
        double_fault: -1.0,
        break_won: 0.5,
        clean_set: 2.5,
        straight_sets: 5.0,
        no_double_fault: 5.0,
        ten_plus_aces: 2.0,
        fifteen_plus_aces: 2.0,
    };

    pub fn for_format(format: MatchFormat) -> &'static ScoringTable {
        match format {
            MatchFormat::BestOf3 => &Self::BEST_OF_3,
            MatchFormat::BestOf5 => &Self::BEST_OF_5,
        }
    }
}

/// Finalized per-player statistics for one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FantasyStatLine {
    pub format: MatchFormat,
    pub match_played: bool,
    pub walkover: bool,
    pub match_won: bool,
    pub aces: u32,
    pub double_faults: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub breaks: u32,
    pub clean_set: bool,
    pub straight_sets: bool,
    pub no_double_fault: bool,
    pub ten_plus_aces: bool,
    pub fifteen_plus_aces: bool,
}

impl FantasyStatLine {
    /// A player who advanced without the match being played.
    pub fn walkover(format: MatchFormat) -> Self {
        Self { format, walkover: true, ..Default::default() }
    }

    pub fn points(&self) -> f64 {
        fantasy_points(self)
    }
}

pub fn fantasy_points(line: &FantasyStatLine) -> f64 {
    let table = ScoringTable::for_format(line.format);
    let flag = |set: bool, value: f64| if set { value } else { 0.0 };

    flag(line.match_played, table.match_played)
        + flag(line.walkover, table.walkover)
        + flag(line.match_won, table.match_won)
        + line.games_won as f64 * table.game_won
        + line.games_lost as f64 * table.game_lost
        + line.sets_won as f64 * table.set_won
        + line.sets_lost as f64 * table.set_lost
        + line.aces as f64 * table.ace
        + line.double_faults as f64 * table.double_fault
        + line.breaks as f64 * table.break_won
        + flag(line.clean_set, table.clean_set)
        + flag(line.straight_sets, table.straight_sets)
        + flag(line.no_double_fault, table.no_double_fault)
        + flag(line.ten_plus_aces, table.ten_plus_aces)
        + flag(line.fifteen_plus_aces, table.fifteen_plus_aces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_sets_win() -> FantasyStatLine {
        FantasyStatLine {
            format: MatchFormat::BestOf3,
            match_played: true,
            walkover: false,
            match_won: true,
            aces: 12,
            double_faults: 2,
            games_won: 14,
            games_lost: 8,
            sets_won: 2,
            sets_lost: 0,
            breaks: 3,
            clean_set: false,
            straight_sets: true,
            no_double_fault: false,
            ten_plus_aces: true,
            fifteen_plus_aces: false,
        }
    }

    #[test]
    fn test_straight_sets_win_scores_by_table() {
        let line = straight_sets_win();
        let points = fantasy_points(&line);
        assert!((points - 80.05).abs() < 1e-9, "got {points}");
        for _ in 0..10 {
            assert_eq!(fantasy_points(&line), points);
        }
    }

    #[test]
    fn test_best_of_five_uses_its_own_table() {
        let line = FantasyStatLine { format: MatchFormat::BestOf5, ..straight_sets_win() };
        // 30 + 5 + 28 - 12.8 + 10 + 3 - 2 + 1.5 + 5 + 2
        assert!((line.points() - 69.7).abs() < 1e-9, "got {}", line.points());
    }

    #[test]
    fn test_walkover() {
        let line = FantasyStatLine::walkover(MatchFormat::BestOf5);
        assert_eq!(line.points(), 30.0);
    }

    #[test]
    fn test_losing_line_can_go_negative() {
        let line = FantasyStatLine {
            format: MatchFormat::BestOf3,
            match_played: true,
            games_won: 0,
            games_lost: 12,
            sets_lost: 2,
            double_faults: 9,
            ..Default::default()
        };
        assert!((line.points() - (30.0 - 24.0 - 6.0 - 9.0)).abs() < 1e-9);
    }
}
