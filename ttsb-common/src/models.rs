//! Scoreboard data model shared by the OCR core and its consumers
//!
//! All types here are plain values: cheap to clone, serializable, and free of
//! any knowledge about how they were produced.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame position within a clip, as reported by the OCR dump
pub type FrameIndex = u64;

/// Side of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    One,
    Two,
}

/// One scoreboard reading: games won (series) and points in the current game
/// (round) for each player.
///
/// Serialized as `[series1, round1, series2, round2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct ScoreTuple {
    pub series1: u32,
    pub round1: u32,
    pub series2: u32,
    pub round2: u32,
}

impl ScoreTuple {
    /// New-game marker shown between matches
    pub const RESET: ScoreTuple = ScoreTuple::new(0, 0, 0, 0);

    pub const fn new(series1: u32, round1: u32, series2: u32, round2: u32) -> Self {
        Self {
            series1,
            round1,
            series2,
            round2,
        }
    }

    pub fn is_reset(&self) -> bool {
        *self == Self::RESET
    }

    pub fn series(&self, player: Player) -> u32 {
        match player {
            Player::One => self.series1,
            Player::Two => self.series2,
        }
    }

    pub fn round(&self, player: Player) -> u32 {
        match player {
            Player::One => self.round1,
            Player::Two => self.round2,
        }
    }
}

impl From<[u32; 4]> for ScoreTuple {
    fn from(v: [u32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<ScoreTuple> for [u32; 4] {
    fn from(s: ScoreTuple) -> Self {
        [s.series1, s.round1, s.series2, s.round2]
    }
}

impl fmt::Display for ScoreTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.series1, self.round1, self.series2, self.round2
        )
    }
}

/// What a legal scoreboard change means in match terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionKind {
    /// One rally won
    Point { player: Player },
    /// Game won: series incremented, both rounds back to zero
    GameWon { player: Player },
    /// Board cleared to 0-0-0-0
    Reset,
}

/// A validated scoreboard change
///
/// `frames` spans from the first frame showing `from` to the first frame
/// showing `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChangeEvent {
    pub frames: (FrameIndex, FrameIndex),
    pub from: ScoreTuple,
    pub to: ScoreTuple,
    pub kind: TransitionKind,
}

/// Normalized scoreboard reading: `[team1, series1, round1, team2, series2, round2]`
///
/// Team fields may hold a doubles pair as `"A/B"`. Holding six named fields
/// makes a malformed record unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub team1: String,
    pub series1: String,
    pub round1: String,
    pub team2: String,
    pub series2: String,
    pub round2: String,
}

impl CanonicalRecord {
    pub fn from_fields(fields: [String; 6]) -> Self {
        let [team1, series1, round1, team2, series2, round2] = fields;
        Self {
            team1,
            series1,
            round1,
            team2,
            series2,
            round2,
        }
    }

    pub fn fields(&self) -> [&str; 6] {
        [
            &self.team1,
            &self.series1,
            &self.round1,
            &self.team2,
            &self.series2,
            &self.round2,
        ]
    }

    /// The two team fields, in board order
    pub fn name_spans(&self) -> [&str; 2] {
        [&self.team1, &self.team2]
    }
}

/// Resolved player slots for one clip; empty string where unknown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipPlayers(pub [String; 4]);

impl ClipPlayers {
    pub fn slots(&self) -> &[String; 4] {
        &self.0
    }

    /// Fill slots in order from `names`, ignoring anything past the fourth
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut players = Self::default();
        for (slot, name) in players.0.iter_mut().zip(names) {
            *slot = name.into();
        }
        players
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(String::is_empty)
    }
}
