//! # Match State Machine
//!
//! `MatchState` is fed one decided game (or tie-break) at a time and moves
//! through `InGame -> InSet -> InMatch -> MatchComplete`. A set closes at six
//! or more games with a two-game margin, or through a tie-break at 6-6; the
//! match closes when a side reaches `sets_to_win`. Once complete the state
//! only yields its result.

use serde::{Deserialize, Serialize};

use super::format::MatchFormat;
use super::scoring::FantasyStatLine;
use crate::engine::ServeEvents;
use crate::error::{Result, SimError};

const GAMES_FOR_SET: u32 = 6;
const TIEBREAK_AT: u32 = 6;
pub const TIEBREAK_POINTS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Player1 => 0,
            Side::Player2 => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Waiting for the next game (or tie-break) of the current set
    InGame,
    /// A game was just decided; set score under evaluation
    InSet,
    /// A set was just decided; match score under evaluation
    InMatch,
    MatchComplete,
}

/// Advance after a unit of play has been decided.
///
/// `set_over` is only read in `InSet`, `match_over` only in `InMatch`.
pub fn next_phase(current: MatchPhase, set_over: bool, match_over: bool) -> MatchPhase {
    match current {
        MatchPhase::InGame => MatchPhase::InSet,
        MatchPhase::InSet => {
            if set_over {
                MatchPhase::InMatch
            } else {
                MatchPhase::InGame
            }
        }
        MatchPhase::InMatch => {
            if match_over {
                MatchPhase::MatchComplete
            } else {
                MatchPhase::InGame
            }
        }
        MatchPhase::MatchComplete => MatchPhase::MatchComplete,
    }
}

/// Whether a set score is decided without a tie-break.
pub fn set_decided(games: [u32; 2]) -> bool {
    let (a, b) = (games[0], games[1]);
    a.max(b) >= GAMES_FOR_SET && a.abs_diff(b) >= 2
}

pub fn tiebreak_decided(points: [u32; 2]) -> bool {
    let (a, b) = (points[0], points[1]);
    a.max(b) >= TIEBREAK_POINTS && a.abs_diff(b) >= 2
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetResult {
    pub number: u8,
    pub winner: Side,
    /// Winner of every game in order; a tie-break counts as the last game
    pub games: Vec<Side>,
    /// Final games, player 1 first
    pub score: [u32; 2],
    /// Tie-break points, player 1 first
    pub tiebreak: Option<[u32; 2]>,
    /// The loser won no games
    pub clean_set: bool,
}

/// Running counting statistics for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTally {
    pub aces: u32,
    pub double_faults: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    /// Games won while receiving serve
    pub breaks: u32,
    pub clean_sets: u32,
}

/// Outcome of feeding one game or tie-break into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    GameRecorded,
    SetClosed { number: u8, winner: Side },
    MatchClosed { winner: Side },
}

#[derive(Debug, Clone)]
pub struct MatchState {
    format: MatchFormat,
    phase: MatchPhase,
    server: Side,
    set_first_server: Side,
    games: [u32; 2],
    sets: [u32; 2],
    tallies: [PlayerTally; 2],
    game_log: Vec<Side>,
    tiebreak: Option<[u32; 2]>,
    completed: Vec<SetResult>,
    winner: Option<Side>,
}

impl MatchState {
    pub fn new(format: MatchFormat, first_server: Side) -> Self {
        Self {
            format,
            phase: MatchPhase::InGame,
            server: first_server,
            set_first_server: first_server,
            games: [0; 2],
            sets: [0; 2],
            tallies: [PlayerTally::default(); 2],
            game_log: Vec::with_capacity(13),
            tiebreak: None,
            completed: Vec::with_capacity(format.best_of() as usize),
            winner: None,
        }
    }

    pub fn format(&self) -> MatchFormat {
        self.format
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == MatchPhase::MatchComplete
    }

    /// Player serving the next game (or the first tie-break point).
    pub fn server(&self) -> Side {
        self.server
    }

    pub fn games(&self) -> [u32; 2] {
        self.games
    }

    pub fn sets(&self) -> [u32; 2] {
        self.sets
    }

    pub fn tally(&self, side: Side) -> &PlayerTally {
        &self.tallies[side.index()]
    }

    pub fn completed_sets(&self) -> &[SetResult] {
        &self.completed
    }

    /// The current set sits at 6-6 and must be settled by a tie-break.
    pub fn tiebreak_due(&self) -> bool {
        self.games == [TIEBREAK_AT, TIEBREAK_AT]
    }

    /// Record a regular service game won by `winner`. Serve events belong to
    /// the current server.
    pub fn record_game(&mut self, winner: Side, events: ServeEvents) -> Result<Step> {
        self.ensure_in_game()?;
        if self.tiebreak_due() {
            return Err(SimError::invalid("set is at 6-6; a tie-break is due"));
        }

        let server = &mut self.tallies[self.server.index()];
        server.aces += events.aces;
        server.double_faults += events.double_faults;
        if winner != self.server {
            self.tallies[winner.index()].breaks += 1;
        }
        self.credit_game(winner);
        self.server = self.server.opponent();

        self.phase = next_phase(self.phase, false, false);
        let set_over = set_decided(self.games);
        Ok(self.after_game(set_over))
    }

    /// Record the tie-break that settles a 6-6 set. The winner takes the set 7-6.
    pub fn record_tiebreak(&mut self, winner: Side, points: [u32; 2]) -> Result<Step> {
        self.ensure_in_game()?;
        if !self.tiebreak_due() {
            return Err(SimError::invalid(format!(
                "tie-break recorded at {}-{}",
                self.games[0], self.games[1]
            )));
        }
        if !tiebreak_decided(points) || points[winner.index()] <= points[winner.opponent().index()] {
            return Err(SimError::invalid(format!(
                "tie-break score {}-{} does not decide it for {winner:?}",
                points[0], points[1]
            )));
        }

        self.tiebreak = Some(points);
        self.credit_game(winner);
        self.phase = next_phase(self.phase, false, false);
        Ok(self.after_game(true))
    }

    /// Consume a finished match into per-player stat lines and set results.
    pub fn into_result(self) -> Result<FinishedMatch> {
        let Some(winner) = self.winner else {
            return Err(SimError::invalid("match is not complete"));
        };
        let lines = [Side::Player1, Side::Player2].map(|side| self.stat_line(side, winner));
        Ok(FinishedMatch { winner, format: self.format, sets: self.completed, lines })
    }

    fn ensure_in_game(&self) -> Result<()> {
        match self.phase {
            MatchPhase::InGame => Ok(()),
            MatchPhase::MatchComplete => Err(SimError::invalid("match is already complete")),
            other => Err(SimError::invalid(format!("cannot play a game in phase {other:?}"))),
        }
    }

    fn credit_game(&mut self, winner: Side) {
        self.games[winner.index()] += 1;
        self.tallies[winner.index()].games_won += 1;
        self.tallies[winner.opponent().index()].games_lost += 1;
        self.game_log.push(winner);
    }

    fn after_game(&mut self, set_over: bool) -> Step {
        self.phase = next_phase(self.phase, set_over, false);
        if !set_over {
            return Step::GameRecorded;
        }

        let winner = if self.games[0] > self.games[1] { Side::Player1 } else { Side::Player2 };
        let clean_set = self.games[winner.opponent().index()] == 0;
        self.sets[winner.index()] += 1;
        self.tallies[winner.index()].sets_won += 1;
        self.tallies[winner.opponent().index()].sets_lost += 1;
        if clean_set {
            self.tallies[winner.index()].clean_sets += 1;
        }

        let number = self.completed.len() as u8 + 1;
        self.completed.push(SetResult {
            number,
            winner,
            games: std::mem::take(&mut self.game_log),
            score: self.games,
            tiebreak: self.tiebreak.take(),
            clean_set,
        });
        self.games = [0; 2];

        let match_over = self.sets[winner.index()] >= u32::from(self.format.sets_to_win());
        self.phase = next_phase(self.phase, true, match_over);
        if match_over {
            self.winner = Some(winner);
            return Step::MatchClosed { winner };
        }

        self.set_first_server = self.set_first_server.opponent();
        self.server = self.set_first_server;
        Step::SetClosed { number, winner }
    }

    fn stat_line(&self, side: Side, winner: Side) -> FantasyStatLine {
        let tally = &self.tallies[side.index()];
        let won = side == winner;
        FantasyStatLine {
            format: self.format,
            match_played: true,
            walkover: false,
            match_won: won,
            aces: tally.aces,
            double_faults: tally.double_faults,
            games_won: tally.games_won,
            games_lost: tally.games_lost,
            sets_won: tally.sets_won,
            sets_lost: tally.sets_lost,
            breaks: tally.breaks,
            clean_set: tally.clean_sets > 0,
            straight_sets: won && tally.sets_lost == 0,
            no_double_fault: tally.double_faults == 0,
            ten_plus_aces: tally.aces >= 10,
            fifteen_plus_aces: tally.aces >= 15,
        }
    }
}

/// A completed match before timing and fantasy points are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedMatch {
    pub winner: Side,
    pub format: MatchFormat,
    pub sets: Vec<SetResult>,
    /// Player 1 first
    pub lines: [FantasyStatLine; 2],
}
