//! # Snapshot game records and scalar game quantities
//!
//! The engine consumes a frozen snapshot in which every real match appears
//! from both sides. This module defines that row shape plus the small
//! strong-typed quantities (points, differentials, match points) that the
//! rest of the crate aggregates.
use crate::school::SchoolName;
use derive_more::{Add, AddAssign, Display, From, Into, Neg, Sum};
use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// Result of a game from the row owner's perspective.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Eq, PartialEq)]
pub enum GameResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
    #[serde(rename = "T")]
    Tie,
}

impl GameResult {
    /// The same game seen from the opponent's side.
    pub fn invert(self) -> Self {
        match self {
            GameResult::Win => GameResult::Loss,
            GameResult::Loss => GameResult::Win,
            GameResult::Tie => GameResult::Tie,
        }
    }

    /// Head-to-head match points in half-point units (W=1, T=½).
    pub fn match_points(self) -> MatchPoints {
        match self {
            GameResult::Win => MatchPoints(2),
            GameResult::Tie => MatchPoints(1),
            GameResult::Loss => MatchPoints(0),
        }
    }
}

/// Non-negative points scored in a game or aggregated across games.
///
/// Capped at 999 to ensure safe casts to i32 and prevent overflow issues.
#[derive(
    Default,
    Debug,
    Display,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Add,
    AddAssign,
    Sum,
)]
pub struct ScorePoints(u32);

impl ScorePoints {
    pub const MAX: u32 = 999;

    /// Create a new ScorePoints from a u32, capped at MAX
    pub fn new(value: u32) -> Result<Self, ScoreError> {
        if value <= Self::MAX {
            Ok(ScorePoints(value))
        } else {
            Err(ScoreError::Overflow(value))
        }
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Infallible constructor for values known to be far below the cap,
    /// such as sampled scores. Saturates at [`ScorePoints::MAX`].
    pub(crate) fn saturating(value: u32) -> Self {
        ScorePoints(value.min(Self::MAX))
    }
}

impl TryFrom<u32> for ScorePoints {
    type Error = ScoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScorePoints> for u32 {
    fn from(points: ScorePoints) -> u32 {
        points.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("score {0} exceeds maximum of {max}", max = ScorePoints::MAX)]
    Overflow(u32),
}

impl Sub for ScorePoints {
    type Output = PointDiff;
    fn sub(self, other: Self) -> Self::Output {
        PointDiff(self.0 as i32 - other.0 as i32)
    }
}

impl num::Zero for ScorePoints {
    fn zero() -> ScorePoints {
        ScorePoints(0)
    }
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Signed point differential.
///
/// Points scored minus points conceded, for a single game or aggregated.
#[derive(
    Default,
    Debug,
    Display,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    From,
    Into,
    Eq,
    Neg,
    PartialEq,
    Ord,
    PartialOrd,
    Add,
    AddAssign,
    Sum,
)]
pub struct PointDiff(pub i32);

impl PointDiff {
    /// Clamp to `[-cap, cap]`.
    pub fn capped(self, cap: i32) -> PointDiff {
        PointDiff(self.0.clamp(-cap, cap))
    }
}

impl num::Zero for PointDiff {
    fn zero() -> PointDiff {
        PointDiff(0)
    }
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Head-to-head match points in half-point units.
///
/// A win is worth 2 units, a tie 1, a loss 0, so that W=1, T=½ bookkeeping
/// stays in exact integer arithmetic. For every ordered pair the symmetry
/// invariant `pts(a,b) + pts(b,a) = 2 * games(a,b)` holds.
#[derive(
    Default,
    Debug,
    Display,
    Clone,
    Copy,
    From,
    Into,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Add,
    AddAssign,
    Sum,
)]
pub struct MatchPoints(pub u32);

impl num::Zero for MatchPoints {
    fn zero() -> MatchPoints {
        MatchPoints(0)
    }
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// One side of a match as it appears in the snapshot.
///
/// Final region games carry a result and scores; non-final region games are
/// schedule-only and get simulated. Non-region and wrong-season rows are
/// ignored by the fixture builder.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GameRecord {
    pub school: SchoolName,
    pub opponent: SchoolName,
    pub season: u16,
    pub is_final: bool,
    pub is_region: bool,
    pub result: Option<GameResult>,
    pub points_for: Option<ScorePoints>,
    pub points_against: Option<ScorePoints>,
}

impl GameRecord {
    /// A final game row with result and scores.
    pub fn played<N: Into<SchoolName>>(
        school: N,
        opponent: N,
        season: u16,
        is_region: bool,
        result: GameResult,
        points_for: u32,
        points_against: u32,
    ) -> Result<Self, ScoreError> {
        Ok(Self {
            school: school.into(),
            opponent: opponent.into(),
            season,
            is_final: true,
            is_region,
            result: Some(result),
            points_for: Some(ScorePoints::new(points_for)?),
            points_against: Some(ScorePoints::new(points_against)?),
        })
    }

    /// A scheduled, not yet played game row.
    pub fn scheduled<N: Into<SchoolName>>(
        school: N,
        opponent: N,
        season: u16,
        is_region: bool,
    ) -> Self {
        Self {
            school: school.into(),
            opponent: opponent.into(),
            season,
            is_final: false,
            is_region,
            result: None,
            points_for: None,
            points_against: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_inversion() {
        assert_eq!(GameResult::Win.invert(), GameResult::Loss);
        assert_eq!(GameResult::Loss.invert(), GameResult::Win);
        assert_eq!(GameResult::Tie.invert(), GameResult::Tie);
    }

    #[test]
    fn match_points_half_units() {
        assert_eq!(GameResult::Win.match_points(), MatchPoints(2));
        assert_eq!(GameResult::Tie.match_points(), MatchPoints(1));
        assert_eq!(GameResult::Loss.match_points(), MatchPoints(0));
    }

    #[test]
    fn score_overflow() {
        assert!(ScorePoints::new(999).is_ok());
        assert_eq!(ScorePoints::new(1000), Err(ScoreError::Overflow(1000)));
    }

    #[test]
    fn diff_capping() {
        assert_eq!(PointDiff(-30).capped(12), PointDiff(-12));
        assert_eq!(PointDiff(30).capped(12), PointDiff(12));
        assert_eq!(PointDiff(5).capped(12), PointDiff(5));
    }

    #[test]
    fn result_serde_letters() {
        assert_eq!(serde_json::to_string(&GameResult::Win).unwrap(), "\"W\"");
        let parsed: GameResult = serde_json::from_str("\"T\"").unwrap();
        assert_eq!(parsed, GameResult::Tie);
    }
}
