//! # Odds accumulation and final playoff odds
//!
//! Trials credit slot counters; after the run the counters become odds,
//! near-certain outcomes are clamped, and the remaining playoff mass is
//! renormalized over the schools still alive.
//!
//! Co-placed schools share their slot range evenly, so counters are kept in
//! integer units of `1/lcm(1..=N)` of a trial. Every share divides exactly,
//! which keeps the odds exact ratios of integers until the single final
//! division, and makes merged results independent of worker scheduling.
use crate::config::{CLINCH_THRESHOLD, ELIM_THRESHOLD, PLAYOFF_SPOTS};
use crate::school::{Roster, SchoolName};
use crate::standings::order::Placing;
use serde::{Deserialize, Serialize};

/// Per-school counters for finishing slots 1..=[`PLAYOFF_SPOTS`].
///
/// Counters only grow; merging sums counterparts. Commutative, so the final
/// counts are independent of how trials were split across workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OddsAccumulator {
    /// One trial in counter units: `lcm(1..=N)`, so an even share of any
    /// possible tie width is an exact integer.
    unit: u64,
    slot_counts: Vec<[u64; PLAYOFF_SPOTS]>,
}

impl OddsAccumulator {
    pub fn new(n: usize) -> Self {
        let unit = (1..=n.max(1) as u64).fold(1, num::integer::lcm);
        Self {
            unit,
            slot_counts: vec![[0; PLAYOFF_SPOTS]; n],
        }
    }

    /// Credit one trial's slot assignment.
    pub fn credit(&mut self, places: &[Placing]) {
        debug_assert_eq!(places.len(), self.slot_counts.len());
        for (counts, place) in self.slot_counts.iter_mut().zip(places) {
            let share = self.unit / u64::from(place.width());
            for slot in 1..=PLAYOFF_SPOTS as u32 {
                if place.covers(slot) {
                    counts[(slot - 1) as usize] += share;
                }
            }
        }
    }

    /// Fold another worker's counters into this one.
    pub fn merge(&mut self, other: &OddsAccumulator) {
        debug_assert_eq!(self.unit, other.unit);
        for (mine, theirs) in self.slot_counts.iter_mut().zip(&other.slot_counts) {
            for (m, t) in mine.iter_mut().zip(theirs) {
                *m += t;
            }
        }
    }

    /// Odds of finishing in `slot` (1-based) over `trials` trials.
    pub fn slot_odds(&self, school: usize, slot: usize, trials: u32) -> f64 {
        if trials == 0 {
            return 0.0;
        }
        self.slot_counts[school][slot - 1] as f64 / (self.unit * u64::from(trials)) as f64
    }

    /// Odds of finishing in any playoff slot.
    pub fn playoff_odds(&self, school: usize, trials: u32) -> f64 {
        if trials == 0 {
            return 0.0;
        }
        let total: u64 = self.slot_counts[school].iter().sum();
        total as f64 / (self.unit * u64::from(trials)) as f64
    }
}

/// Renormalized playoff odds of one school.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalOdds {
    pub final_odds_playoffs: f64,
    pub clinched: bool,
    pub eliminated: bool,
}

/// Clamp and renormalize raw playoff odds.
///
/// Clinched schools (odds at or above the clinch threshold) lock a spot at
/// 1.0 and eliminated schools (at or below the elimination threshold) drop
/// to 0.0; the free playoff-spot mass is then redistributed over the active
/// schools proportionally to their raw odds. The scaled value is clamped at
/// the same thresholds again, so an active school pushed past the clinch
/// threshold by renormalization comes out clinched.
///
/// With no active schools the raw odds are kept as they are.
pub fn renormalize(odds_playoffs: &[f64], spots: usize) -> Vec<FinalOdds> {
    let clinched_count = odds_playoffs
        .iter()
        .filter(|o| **o >= CLINCH_THRESHOLD)
        .count();
    let free_spots = spots as f64 - clinched_count as f64;
    let sum_active: f64 = odds_playoffs
        .iter()
        .filter(|o| **o < CLINCH_THRESHOLD && **o > ELIM_THRESHOLD)
        .sum();
    odds_playoffs
        .iter()
        .map(|&odds| {
            let scaled = if odds >= CLINCH_THRESHOLD {
                1.0
            } else if odds <= ELIM_THRESHOLD {
                0.0
            } else if sum_active > 0.0 {
                odds * free_spots / sum_active
            } else {
                odds
            };
            let clinched = scaled >= CLINCH_THRESHOLD;
            let eliminated = scaled <= ELIM_THRESHOLD;
            let final_odds_playoffs = if clinched {
                1.0
            } else if eliminated {
                0.0
            } else {
                scaled
            };
            FinalOdds {
                final_odds_playoffs,
                clinched,
                eliminated,
            }
        })
        .collect()
}

/// One output row, odds rounded to five decimals.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OddsRow {
    pub school: SchoolName,
    pub class: u16,
    pub region: u16,
    pub season: u16,
    pub odds_1st: f64,
    pub odds_2nd: f64,
    pub odds_3rd: f64,
    pub odds_4th: f64,
    pub odds_playoffs: f64,
    pub final_odds_playoffs: f64,
    pub clinched: bool,
    pub eliminated: bool,
}

/// Result of a full run.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OddsReport {
    pub rows: Vec<OddsRow>,
    /// Seed actually used; reported back so an entropy-chosen seed can be
    /// replayed.
    pub seed: u64,
    pub trials_requested: u32,
    pub trials_completed: u32,
    /// True when cooperative cancellation cut the run short; the rows then
    /// reflect `trials_completed` trials only.
    pub cancelled: bool,
}

/// Turn accumulated counts into sorted output rows.
///
/// With zero completed trials (a run cancelled before its first trial)
/// every odds field is zero and no flag is set; nothing can be inferred.
pub(crate) fn finalize_rows(
    acc: &OddsAccumulator,
    roster: &Roster,
    trials_completed: u32,
) -> Vec<OddsRow> {
    let key = roster.key();
    let playoff: Vec<f64> = roster
        .ids()
        .map(|id| acc.playoff_odds(id.idx(), trials_completed))
        .collect();
    let finals = if trials_completed > 0 {
        renormalize(&playoff, PLAYOFF_SPOTS)
    } else {
        playoff
            .iter()
            .map(|_| FinalOdds {
                final_odds_playoffs: 0.0,
                clinched: false,
                eliminated: false,
            })
            .collect()
    };
    let mut rows: Vec<OddsRow> = roster
        .ids()
        .zip(finals)
        .map(|(id, fin)| OddsRow {
            school: roster.name(id).clone(),
            class: key.class,
            region: key.region,
            season: key.season,
            odds_1st: round5(acc.slot_odds(id.idx(), 1, trials_completed)),
            odds_2nd: round5(acc.slot_odds(id.idx(), 2, trials_completed)),
            odds_3rd: round5(acc.slot_odds(id.idx(), 3, trials_completed)),
            odds_4th: round5(acc.slot_odds(id.idx(), 4, trials_completed)),
            odds_playoffs: round5(playoff[id.idx()]),
            final_odds_playoffs: round5(fin.final_odds_playoffs),
            clinched: fin.clinched,
            eliminated: fin.eliminated,
        })
        .collect();
    rows.sort_by(|x, y| {
        x.region
            .cmp(&y.region)
            .then(y.final_odds_playoffs.total_cmp(&x.final_odds_playoffs))
            .then(x.school.cmp(&y.school))
    });
    rows
}

pub(crate) fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}
