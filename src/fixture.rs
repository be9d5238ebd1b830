//! # Fixture builder
//!
//! Turns the frozen snapshot into the immutable inputs of a run: the region
//! [`Roster`], the completed pairs (with canonical results and scores) and
//! the remaining pairs still to be simulated.
//!
//! Every real match appears in the snapshot from both sides. Both-sided rows
//! collapse onto a unique unordered pair key `(a, b)` with `a < b` by school
//! name. When both sides of a completed game are present, the canonical side
//! is `a` (the lesser school name) and its scores are used; a row carried
//! only by `b` is inverted. This is the single place where snapshot defects
//! are reconciled: sides whose *results* conflict after inversion are not
//! recoverable and fail the build.
use crate::game::{GameRecord, GameResult, PointDiff, ScorePoints};
use crate::school::{RegionKey, Roster, SchoolId, SchoolName, SchoolRecord};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum FixtureError {
    #[error("no schools match {0}")]
    EmptyRegion(RegionKey),
    #[error("region game {school} vs {opponent} references a school outside the region")]
    MissingOpponent {
        school: SchoolName,
        opponent: SchoolName,
    },
    #[error("conflicting snapshot rows for {a} vs {b}: {detail}")]
    InconsistentPair {
        a: SchoolName,
        b: SchoolName,
        detail: String,
    },
    #[error("final region game {school} vs {opponent} is missing its result or score")]
    IncompleteResult {
        school: SchoolName,
        opponent: SchoolName,
    },
}

/// A region matchup already decided, from the canonical side `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedPair {
    pub a: SchoolId,
    pub b: SchoolId,
    pub res_a: GameResult,
    pub points_a: ScorePoints,
    pub points_b: ScorePoints,
}

impl CompletedPair {
    /// Signed point differential from `a`'s perspective.
    pub fn pd_a(&self) -> PointDiff {
        self.points_a - self.points_b
    }
}

/// A region matchup still to be played, `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainingPair {
    pub a: SchoolId,
    pub b: SchoolId,
}

/// Immutable fixture set of a run.
///
/// For every region pair there is exactly one record here, either completed
/// xor remaining.
#[derive(Debug, Clone)]
pub struct Fixtures {
    roster: Roster,
    completed: Vec<CompletedPair>,
    remaining: Vec<RemainingPair>,
}

// One side of a completed game, normalized to the canonical perspective.
#[derive(Debug, Clone, Copy)]
struct NormalizedSide {
    res_a: GameResult,
    points_a: ScorePoints,
    points_b: ScorePoints,
}

#[derive(Debug, Default)]
struct PairSides {
    from_a: Option<NormalizedSide>,
    from_b: Option<NormalizedSide>,
    scheduled: bool,
}

impl Fixtures {
    /// Build fixtures from the snapshot.
    ///
    /// Rows outside the region key (wrong season, non-region, or owned by a
    /// school that is not in the region set) are ignored.
    ///
    /// # Errors
    ///
    /// - [`FixtureError::EmptyRegion`] if no school matches the key.
    /// - [`FixtureError::MissingOpponent`] if a region game of a region
    ///   school names an opponent outside the region set.
    /// - [`FixtureError::IncompleteResult`] if a final region game lacks a
    ///   result or a score.
    /// - [`FixtureError::InconsistentPair`] if the two sides of a pair
    ///   cannot be reconciled (result conflict, completed and scheduled at
    ///   once, or a school paired with itself).
    pub fn try_new(
        schools: &[SchoolRecord],
        games: &[GameRecord],
        key: RegionKey,
    ) -> Result<Self, FixtureError> {
        let names: Vec<SchoolName> = schools
            .iter()
            .filter(|s| s.matches(&key))
            .map(|s| s.school.clone())
            .collect();
        if names.is_empty() {
            return Err(FixtureError::EmptyRegion(key));
        }
        let roster = Roster::new(key, names);

        let mut pairs: BTreeMap<(SchoolId, SchoolId), PairSides> = BTreeMap::new();
        for game in games
            .iter()
            .filter(|g| g.season == key.season && g.is_region)
        {
            let school = match roster.id_of(&game.school) {
                Some(id) => id,
                // Foreign school's row; the in-region side carries its own.
                None => continue,
            };
            let opponent =
                roster
                    .id_of(&game.opponent)
                    .ok_or_else(|| FixtureError::MissingOpponent {
                        school: game.school.clone(),
                        opponent: game.opponent.clone(),
                    })?;
            if school == opponent {
                return Err(FixtureError::InconsistentPair {
                    a: game.school.clone(),
                    b: game.opponent.clone(),
                    detail: String::from("a school cannot play itself"),
                });
            }
            let (a, b) = (school.min(opponent), school.max(opponent));
            let sides = pairs.entry((a, b)).or_default();
            if game.is_final {
                let side = Self::normalize_side(game, school == a)?;
                let slot = if school == a {
                    &mut sides.from_a
                } else {
                    &mut sides.from_b
                };
                // First row per side wins; later duplicates of the same side
                // are dropped.
                slot.get_or_insert(side);
            } else {
                sides.scheduled = true;
            }
        }

        let mut completed = Vec::new();
        let mut remaining = Vec::new();
        for ((a, b), sides) in pairs {
            let canonical = Self::reconcile(&roster, a, b, sides)?;
            match canonical {
                Some(side) => completed.push(CompletedPair {
                    a,
                    b,
                    res_a: side.res_a,
                    points_a: side.points_a,
                    points_b: side.points_b,
                }),
                None => remaining.push(RemainingPair { a, b }),
            }
        }

        Ok(Self {
            roster,
            completed,
            remaining,
        })
    }

    fn normalize_side(game: &GameRecord, owner_is_a: bool) -> Result<NormalizedSide, FixtureError> {
        let (result, points_for, points_against) =
            match (game.result, game.points_for, game.points_against) {
                (Some(res), Some(pf), Some(pa)) => (res, pf, pa),
                _ => {
                    return Err(FixtureError::IncompleteResult {
                        school: game.school.clone(),
                        opponent: game.opponent.clone(),
                    })
                }
            };
        Ok(if owner_is_a {
            NormalizedSide {
                res_a: result,
                points_a: points_for,
                points_b: points_against,
            }
        } else {
            NormalizedSide {
                res_a: result.invert(),
                points_a: points_against,
                points_b: points_for,
            }
        })
    }

    fn reconcile(
        roster: &Roster,
        a: SchoolId,
        b: SchoolId,
        sides: PairSides,
    ) -> Result<Option<NormalizedSide>, FixtureError> {
        let completed = match (sides.from_a, sides.from_b) {
            (Some(from_a), Some(from_b)) => {
                if from_a.res_a != from_b.res_a {
                    return Err(FixtureError::InconsistentPair {
                        a: roster.name(a).clone(),
                        b: roster.name(b).clone(),
                        detail: String::from("the two sides disagree on the result"),
                    });
                }
                // Scores may drift between the two sides of a scrape; the
                // canonical a-side record is used.
                Some(from_a)
            }
            (Some(from_a), None) => Some(from_a),
            (None, Some(from_b)) => Some(from_b),
            (None, None) => None,
        };
        if completed.is_some() && sides.scheduled {
            return Err(FixtureError::InconsistentPair {
                a: roster.name(a).clone(),
                b: roster.name(b).clone(),
                detail: String::from("pair is both completed and remaining"),
            });
        }
        Ok(completed)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn completed(&self) -> impl Iterator<Item = &CompletedPair> {
        self.completed.iter()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &RemainingPair> {
        self.remaining.iter()
    }

    /// Region games (played or not) touching each school.
    ///
    /// Used by tests to check the pairs-per-school invariant.
    pub fn games_per_school(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.roster.len()];
        let touched = self
            .completed
            .iter()
            .map(|p| (p.a, p.b))
            .chain(self.remaining.iter().map(|p| (p.a, p.b)));
        for (a, b) in touched {
            counts[a.idx()] += 1;
            counts[b.idx()] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> RegionKey {
        RegionKey::new(5, 2, 2024)
    }

    fn schools(names: &[&str]) -> Vec<SchoolRecord> {
        names
            .iter()
            .map(|n| SchoolRecord::new(*n, 5, 2, 2024))
            .collect()
    }

    #[test]
    fn empty_region() {
        let games = vec![];
        let err = Fixtures::try_new(&schools(&[]), &games, key()).unwrap_err();
        assert!(matches!(err, FixtureError::EmptyRegion(_)));
    }

    #[test]
    fn both_sides_collapse_to_one_pair() {
        let games = vec![
            GameRecord::played("Amory", "Corinth", 2024, true, GameResult::Win, 21, 7).unwrap(),
            GameRecord::played("Corinth", "Amory", 2024, true, GameResult::Loss, 7, 21).unwrap(),
        ];
        let fixtures = Fixtures::try_new(&schools(&["Amory", "Corinth"]), &games, key()).unwrap();
        let completed: Vec<_> = fixtures.completed().collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].res_a, GameResult::Win);
        assert_eq!(completed[0].pd_a(), PointDiff(14));
        assert_eq!(fixtures.remaining().count(), 0);
    }

    #[test]
    fn lone_b_side_is_inverted() {
        // Only Corinth's row is present; Amory is the lesser name.
        let games =
            vec![GameRecord::played("Corinth", "Amory", 2024, true, GameResult::Loss, 7, 21).unwrap()];
        let fixtures = Fixtures::try_new(&schools(&["Amory", "Corinth"]), &games, key()).unwrap();
        let completed: Vec<_> = fixtures.completed().collect();
        assert_eq!(completed[0].res_a, GameResult::Win);
        assert_eq!(completed[0].points_a, ScorePoints::new(21).unwrap());
        assert_eq!(completed[0].points_b, ScorePoints::new(7).unwrap());
    }

    #[test]
    fn disagreeing_results_fail() {
        let games = vec![
            GameRecord::played("Amory", "Corinth", 2024, true, GameResult::Win, 21, 7).unwrap(),
            GameRecord::played("Corinth", "Amory", 2024, true, GameResult::Win, 21, 7).unwrap(),
        ];
        let err = Fixtures::try_new(&schools(&["Amory", "Corinth"]), &games, key()).unwrap_err();
        assert!(matches!(err, FixtureError::InconsistentPair { .. }));
    }

    #[test]
    fn score_drift_resolves_to_a_side() {
        let games = vec![
            GameRecord::played("Amory", "Corinth", 2024, true, GameResult::Win, 21, 7).unwrap(),
            GameRecord::played("Corinth", "Amory", 2024, true, GameResult::Loss, 6, 21).unwrap(),
        ];
        let fixtures = Fixtures::try_new(&schools(&["Amory", "Corinth"]), &games, key()).unwrap();
        let completed: Vec<_> = fixtures.completed().collect();
        assert_eq!(completed[0].points_b, ScorePoints::new(7).unwrap());
    }

    #[test]
    fn missing_opponent() {
        let games =
            vec![GameRecord::played("Amory", "Tupelo", 2024, true, GameResult::Win, 21, 7).unwrap()];
        let err = Fixtures::try_new(&schools(&["Amory", "Corinth"]), &games, key()).unwrap_err();
        assert!(matches!(err, FixtureError::MissingOpponent { .. }));
    }

    #[test]
    fn foreign_rows_and_non_region_rows_ignored() {
        let games = vec![
            // Tupelo is not in the region; its row is ignored.
            GameRecord::played("Tupelo", "Oxford", 2024, true, GameResult::Win, 21, 7).unwrap(),
            // Non-region game of a region school is ignored.
            GameRecord::played("Amory", "Tupelo", 2024, false, GameResult::Win, 21, 7).unwrap(),
            // Wrong season is ignored.
            GameRecord::played("Amory", "Corinth", 2023, true, GameResult::Win, 21, 7).unwrap(),
        ];
        let fixtures = Fixtures::try_new(&schools(&["Amory", "Corinth"]), &games, key()).unwrap();
        assert_eq!(fixtures.completed().count(), 0);
        assert_eq!(fixtures.remaining().count(), 0);
    }

    #[test]
    fn completed_and_scheduled_conflict() {
        let games = vec![
            GameRecord::played("Amory", "Corinth", 2024, true, GameResult::Win, 21, 7).unwrap(),
            GameRecord::scheduled("Corinth", "Amory", 2024, true),
        ];
        let err = Fixtures::try_new(&schools(&["Amory", "Corinth"]), &games, key()).unwrap_err();
        assert!(matches!(err, FixtureError::InconsistentPair { .. }));
    }

    #[test]
    fn remaining_pairs_dedup() {
        let games = vec![
            GameRecord::scheduled("Amory", "Corinth", 2024, true),
            GameRecord::scheduled("Corinth", "Amory", 2024, true),
        ];
        let fixtures = Fixtures::try_new(&schools(&["Amory", "Corinth"]), &games, key()).unwrap();
        let remaining: Vec<_> = fixtures.remaining().collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].a, SchoolId(0));
        assert_eq!(remaining[0].b, SchoolId(1));
    }

    #[test]
    fn games_per_school_counts_pairs() {
        let games = vec![
            GameRecord::played("Amory", "Corinth", 2024, true, GameResult::Win, 21, 7).unwrap(),
            GameRecord::scheduled("Amory", "Oxford", 2024, true),
        ];
        let fixtures =
            Fixtures::try_new(&schools(&["Amory", "Corinth", "Oxford"]), &games, key()).unwrap();
        assert_eq!(fixtures.games_per_school(), vec![2, 1, 1]);
    }
}
