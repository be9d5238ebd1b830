//! # Region standings
//!
//! Nothing in a trial is stored that could be derived: a school's standing
//! is computed from its accumulated [`TeamLine`] when the ranker asks for
//! it. The primary standings partition is the *bucket*: a dense-rank group
//! of schools sharing region win percentage and region losses. Buckets are
//! the unit the tiebreak ranker in [`order`] works within.
pub mod h2h;
pub mod order;

use crate::game::{GameResult, ScorePoints};
use crate::school::SchoolId;
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt;

/// Accumulated region record of one school within a trial.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamLine {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_allowed: u32,
}

impl TeamLine {
    /// Fold one region game into the line.
    pub fn record(&mut self, result: GameResult, allowed: ScorePoints) {
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Loss => self.losses += 1,
            GameResult::Tie => self.ties += 1,
        }
        self.points_allowed += allowed.as_u32();
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Region win percentage, `(W + ½T) / gp`; zero if no games played.
    pub fn win_pct(&self) -> WinPct {
        WinPct::new(self.wins, self.ties, self.games())
    }
}

/// Exact-rational win percentage.
///
/// Held as `(2W + T)` half-wins over games played and compared by cross
/// multiplication, so equal percentages from different game counts compare
/// equal without floating point. A school with no games has percentage zero.
#[derive(Debug, Clone, Copy)]
pub struct WinPct {
    half_wins: u32,
    games: u32,
}

impl WinPct {
    pub fn new(wins: u32, ties: u32, games: u32) -> Self {
        Self {
            half_wins: 2 * wins + ties,
            games: games.max(1),
        }
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.half_wins) / f64::from(2 * self.games)
    }
}

impl PartialEq for WinPct {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WinPct {}

impl PartialOrd for WinPct {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WinPct {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u64::from(self.half_wins) * u64::from(other.games);
        let rhs = u64::from(other.half_wins) * u64::from(self.games);
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for WinPct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.as_f64())
    }
}

/// Standings comparison: `(win_pct desc, losses asc, school asc)`.
///
/// The school component is a stability tiebreak only; bucket membership
/// never looks at it.
pub(crate) fn standings_cmp(lines: &[TeamLine], x: SchoolId, y: SchoolId) -> Ordering {
    let (lx, ly) = (&lines[x.idx()], &lines[y.idx()]);
    ly.win_pct()
        .cmp(&lx.win_pct())
        .then(lx.losses.cmp(&ly.losses))
        .then(x.cmp(&y))
}

/// Partition schools into base buckets, best bucket first.
///
/// A dense rank over strictly `(win_pct desc, losses asc)`: schools equal on
/// both share a bucket regardless of name.
pub fn base_buckets(lines: &[TeamLine]) -> Vec<Vec<SchoolId>> {
    let mut buckets: Vec<Vec<SchoolId>> = Vec::new();
    let sorted = (0..lines.len() as u32)
        .map(SchoolId)
        .sorted_by(|x, y| standings_cmp(lines, *x, *y));
    for id in sorted {
        let line = &lines[id.idx()];
        let tied_with_last = buckets.last().map_or(false, |bucket| {
            let head = &lines[bucket[0].idx()];
            head.win_pct() == line.win_pct() && head.losses == line.losses
        });
        if !tied_with_last {
            buckets.push(vec![id]);
        } else if let Some(bucket) = buckets.last_mut() {
            bucket.push(id);
        }
    }
    buckets
}

/// Schools outside `bucket`, ranked by the standings comparison.
///
/// This is the opponent ordering the lexicographic tiebreak steps walk.
pub(crate) fn outside_ranked(lines: &[TeamLine], bucket: &[SchoolId]) -> Vec<SchoolId> {
    (0..lines.len() as u32)
        .map(SchoolId)
        .filter(|id| !bucket.contains(id))
        .sorted_by(|x, y| standings_cmp(lines, *x, *y))
        .collect()
}
