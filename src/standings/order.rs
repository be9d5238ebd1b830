//! # Place assignment and the five-step tiebreak
//!
//! Buckets come out of [`base_buckets`](super::base_buckets) coarsely
//! ordered; this module turns them into an absolute 1..N slot assignment.
//!
//! A bucket of tied schools starts as one undivided group:
//!
//! `[[AMO, COR, OXF]]`
//!
//! Each tiebreak step computes a key per school and splits every non-sole
//! group into strictly ordered subgroups of equal key:
//!
//! `[[AMO], [COR, OXF]]`
//!
//! The refinement is greedy: a step only runs if the partition is not yet
//! strict, and a group already down to one school passes through untouched.
//! Unlike an ordering that forces strictness with a final coin flip, schools
//! still tied after the last step stay together and share a contiguous slot
//! range `[first, last]` at the bucket's offset.
//!
//! The five steps, keyed per school `s` within bucket `B` and against the
//! ranked outside set `OUT`:
//!
//! 1. head-to-head match points summed over `B \ {s}`, higher better;
//! 2. results against each `o ∈ OUT` in rank order, compared
//!    lexicographically with no-game least;
//! 3. head-to-head point differential summed over `B \ {s}`, clamped to
//!    ±[`PD_CAP`] per opponent, higher better;
//! 4. point differentials against `OUT` in the same order, uncapped,
//!    lexicographic, no-game least;
//! 5. region points allowed, lower better.
use crate::config::PD_CAP;
use crate::game::{MatchPoints, PointDiff};
use crate::school::SchoolId;
use crate::standings::h2h::{H2hCell, H2hTable};
use crate::standings::{base_buckets, outside_ranked, TeamLine};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Finishing places a school covers in a trial: slots `first..=last`,
/// 1-based. Width above one means the school is co-placed with the schools
/// sharing the range.
#[derive(Default, Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Placing {
    pub first: u32,
    pub last: u32,
}

impl Placing {
    pub fn covers(&self, slot: u32) -> bool {
        self.first <= slot && slot <= self.last
    }

    pub fn width(&self) -> u32 {
        self.last - self.first + 1
    }
}

/// Assign every school its slot range for one complete set of outcomes.
pub fn assign_places(lines: &[TeamLine], h2h: &H2hTable) -> Vec<Placing> {
    let mut places = Vec::new();
    assign_places_into(lines, h2h, &mut places);
    places
}

/// [`assign_places`] into a reusable buffer.
pub fn assign_places_into(lines: &[TeamLine], h2h: &H2hTable, places: &mut Vec<Placing>) {
    places.clear();
    places.resize(lines.len(), Placing::default());
    let mut next_slot = 1u32;
    for bucket in base_buckets(lines) {
        if let [sole] = bucket[..] {
            places[sole.idx()] = Placing {
                first: next_slot,
                last: next_slot,
            };
            next_slot += 1;
            continue;
        }
        let outside = outside_ranked(lines, &bucket);
        for group in order_bucket(&bucket, lines, h2h, &outside).into_groups() {
            let first = next_slot;
            let last = next_slot + group.len() as u32 - 1;
            for school in &group {
                places[school.idx()] = Placing { first, last };
            }
            next_slot = last + 1;
        }
    }
}

/// Apply the five steps to one bucket.
///
/// The returned partition is ordered best-first; residual groups are the
/// co-placements. Group members stay in school order, which stabilizes the
/// output without ever splitting a tie.
pub(crate) fn order_bucket(
    bucket: &[SchoolId],
    lines: &[TeamLine],
    h2h: &H2hTable,
    outside: &[SchoolId],
) -> Partition {
    let mut part = Partition::single(bucket.to_vec());
    if !part.is_strict() {
        part = part.refine_by_key(|s| h2h_points_among(s, bucket, h2h));
    }
    if !part.is_strict() {
        part = part.refine_by_key(|s| outside_slate(s, outside, h2h, |cell| cell.pts));
    }
    if !part.is_strict() {
        part = part.refine_by_key(|s| capped_pd_among(s, bucket, h2h));
    }
    if !part.is_strict() {
        part = part.refine_by_key(|s| outside_slate(s, outside, h2h, |cell| cell.pd));
    }
    if !part.is_strict() {
        part = part.refine_by_key(|s| Reverse(lines[s.idx()].points_allowed));
    }
    part
}

/// Step 1/3 source: head-to-head match points vs the other tied teams.
fn h2h_points_among(school: SchoolId, bucket: &[SchoolId], h2h: &H2hTable) -> MatchPoints {
    bucket
        .iter()
        .filter(|o| **o != school)
        .map(|o| h2h.cell(school, *o).pts)
        .sum()
}

/// Step 3: per-opponent capped head-to-head differential.
fn capped_pd_among(school: SchoolId, bucket: &[SchoolId], h2h: &H2hTable) -> PointDiff {
    bucket
        .iter()
        .filter(|o| **o != school)
        .map(|o| h2h.cell(school, *o).pd.capped(PD_CAP))
        .sum()
}

/// Step 2/4: the school's values against the ranked outside opponents.
fn outside_slate<V, F>(
    school: SchoolId,
    outside: &[SchoolId],
    h2h: &H2hTable,
    value: F,
) -> OpponentSlate<V>
where
    V: Ord,
    F: Fn(&H2hCell) -> V,
{
    OpponentSlate(
        outside
            .iter()
            .map(|o| {
                let cell = h2h.cell(school, *o);
                cell.played().then(|| value(cell))
            })
            .collect(),
    )
}

/// Values against the ranked outside opponents, one entry per opponent.
///
/// Compared lexicographically; a missing game (`None`) ranks below any
/// played result, which is exactly `Option`'s ordering, relied upon here on
/// purpose.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct OpponentSlate<V: Ord>(Vec<Option<V>>);

/// Ordered partition of a bucket into groups of (still) equal schools.
///
/// Groups are sorted best-first; a partition is strict when every group has
/// exactly one member.
#[derive(Debug, PartialEq)]
pub(crate) struct Partition(Vec<Vec<SchoolId>>);

impl Partition {
    fn single(group: Vec<SchoolId>) -> Self {
        Partition(vec![group])
    }

    fn is_strict(&self) -> bool {
        self.0.iter().all(|group| group.len() == 1)
    }

    pub(crate) fn into_groups(self) -> Vec<Vec<SchoolId>> {
        self.0
    }

    /// Split every non-sole group by descending key.
    ///
    /// Schools with equal keys stay grouped. Within a group the school order
    /// is preserved (ascending, as established by the base bucket sort).
    fn refine_by_key<K, F>(self, key_of: F) -> Partition
    where
        K: Ord,
        F: Fn(SchoolId) -> K,
    {
        let refined = self.0.into_iter().fold(Vec::new(), |mut acc, group| {
            if group.len() == 1 {
                acc.push(group);
            } else {
                acc.extend(split_group(group, &key_of));
            }
            acc
        });
        Partition(refined)
    }
}

fn split_group<K, F>(group: Vec<SchoolId>, key_of: &F) -> Vec<Vec<SchoolId>>
where
    K: Ord,
    F: Fn(SchoolId) -> K,
{
    let mut keyed: Vec<(SchoolId, K)> = group.into_iter().map(|s| (s, key_of(s))).collect();
    keyed.sort_by(|x, y| y.1.cmp(&x.1).then(x.0.cmp(&y.0)));
    let (_, split) = keyed
        .into_iter()
        .fold((None, Vec::new()), |(prev, acc), (id, key)| {
            let acc = if prev.as_ref() == Some(&key) {
                extend_last(acc, id)
            } else {
                let mut acc = acc;
                acc.push(vec![id]);
                acc
            };
            (Some(key), acc)
        });
    split
}

fn extend_last(mut groups: Vec<Vec<SchoolId>>, id: SchoolId) -> Vec<Vec<SchoolId>> {
    let mut last = groups.pop().unwrap_or_default();
    last.push(id);
    groups.push(last);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameResult, ScorePoints};

    // Replay a decided game into lines + h2h, mirroring what a trial does.
    fn play(
        lines: &mut [TeamLine],
        h2h: &mut H2hTable,
        winner: SchoolId,
        loser: SchoolId,
        winner_pts: u32,
        loser_pts: u32,
    ) {
        lines[winner.idx()].record(GameResult::Win, ScorePoints::new(loser_pts).unwrap());
        lines[loser.idx()].record(GameResult::Loss, ScorePoints::new(winner_pts).unwrap());
        h2h.record(
            winner,
            loser,
            GameResult::Win,
            PointDiff(winner_pts as i32 - loser_pts as i32),
        );
    }

    fn ids(raw: &[u32]) -> Vec<SchoolId> {
        raw.iter().copied().map(SchoolId).collect()
    }

    #[test]
    fn strict_records_give_strict_slots() {
        // 0 beats everyone, 1 beats 2 and 3, 2 beats 3.
        let mut lines = vec![TeamLine::default(); 4];
        let mut h2h = H2hTable::new(4);
        for (w, l) in [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)] {
            play(&mut lines, &mut h2h, SchoolId(w), SchoolId(l), 21, 7);
        }
        let places = assign_places(&lines, &h2h);
        for (idx, place) in places.iter().enumerate() {
            let slot = idx as u32 + 1;
            assert_eq!(*place, Placing { first: slot, last: slot });
        }
    }

    #[test]
    fn unbroken_cycle_shares_slot_range() {
        // 0 > 1 > 2 > 0, all by five, and everyone beats 3 identically.
        let mut lines = vec![TeamLine::default(); 4];
        let mut h2h = H2hTable::new(4);
        play(&mut lines, &mut h2h, SchoolId(0), SchoolId(1), 15, 10);
        play(&mut lines, &mut h2h, SchoolId(1), SchoolId(2), 15, 10);
        play(&mut lines, &mut h2h, SchoolId(2), SchoolId(0), 15, 10);
        for w in 0..3 {
            play(&mut lines, &mut h2h, SchoolId(w), SchoolId(3), 20, 10);
        }
        let places = assign_places(&lines, &h2h);
        for idx in 0..3 {
            assert_eq!(places[idx], Placing { first: 1, last: 3 });
        }
        assert_eq!(places[3], Placing { first: 4, last: 4 });
    }

    #[test]
    fn capped_differential_uses_twelve() {
        // Cycle 0 > 1 > 2 > 0 with margins 30, 10, 5. Capped sums are
        // 0: +12-5 = +7, 1: -12+10 = -2, 2: +5-10 = -5, so the order is
        // 0, 1, 2. Uncapped it would be 0 (+25), 2 (-5), 1 (-20).
        let mut lines = vec![TeamLine::default(); 3];
        let mut h2h = H2hTable::new(3);
        play(&mut lines, &mut h2h, SchoolId(0), SchoolId(1), 40, 10);
        play(&mut lines, &mut h2h, SchoolId(1), SchoolId(2), 20, 10);
        play(&mut lines, &mut h2h, SchoolId(2), SchoolId(0), 15, 10);
        // Equalize points allowed so step 5 cannot hide a wrong step 3.
        for line in lines.iter_mut() {
            line.points_allowed = 50;
        }
        let bucket = ids(&[0, 1, 2]);
        let part = order_bucket(&bucket, &lines, &h2h, &[]);
        assert_eq!(
            part.into_groups(),
            vec![ids(&[0]), ids(&[1]), ids(&[2])]
        );
    }

    #[test]
    fn outside_results_compare_null_least() {
        // Bucket {0, 1}; outside opponents ranked 2, 3, 4. School 0 beat
        // ranks one and three, school 1 beat ranks one and two. At the
        // second entry a win beats no-game, so school 1 wins the step.
        let mut lines = vec![TeamLine::default(); 5];
        let mut h2h = H2hTable::new(5);
        play(&mut lines, &mut h2h, SchoolId(0), SchoolId(2), 21, 14);
        play(&mut lines, &mut h2h, SchoolId(0), SchoolId(4), 21, 14);
        play(&mut lines, &mut h2h, SchoolId(1), SchoolId(2), 21, 14);
        play(&mut lines, &mut h2h, SchoolId(1), SchoolId(3), 21, 14);
        let part = order_bucket(
            &ids(&[0, 1]),
            &lines,
            &h2h,
            &ids(&[2, 3, 4]),
        );
        assert_eq!(part.into_groups(), vec![ids(&[1]), ids(&[0])]);
    }

    #[test]
    fn points_allowed_breaks_final_ties() {
        // No games between the pair, no outside games: only step 5 is left.
        let mut lines = vec![TeamLine::default(); 2];
        lines[0].points_allowed = 60;
        lines[1].points_allowed = 40;
        let h2h = H2hTable::new(2);
        let part = order_bucket(&ids(&[0, 1]), &lines, &h2h, &[]);
        assert_eq!(part.into_groups(), vec![ids(&[1]), ids(&[0])]);
    }

    #[test]
    fn head_to_head_winner_leads_bucket() {
        // Both 1-1 overall, 0 beat 1 head-to-head.
        let mut lines = vec![TeamLine::default(); 4];
        let mut h2h = H2hTable::new(4);
        play(&mut lines, &mut h2h, SchoolId(0), SchoolId(1), 21, 14);
        play(&mut lines, &mut h2h, SchoolId(2), SchoolId(0), 28, 7);
        play(&mut lines, &mut h2h, SchoolId(1), SchoolId(3), 35, 0);
        let bucket = ids(&[0, 1]);
        let outside = outside_ranked(&lines, &bucket);
        let part = order_bucket(&bucket, &lines, &h2h, &outside);
        assert_eq!(part.into_groups(), vec![ids(&[0]), ids(&[1])]);
    }

    #[test]
    fn slot_ranges_partition_all_slots() {
        // Mixed ties: 0 and 1 tied and inseparable, 2 strictly last.
        let mut lines = vec![TeamLine::default(); 3];
        let mut h2h = H2hTable::new(3);
        play(&mut lines, &mut h2h, SchoolId(0), SchoolId(2), 20, 10);
        play(&mut lines, &mut h2h, SchoolId(1), SchoolId(2), 20, 10);
        let places = assign_places(&lines, &h2h);
        let mut coverage = vec![0u32; 3];
        for place in &places {
            for slot in place.first..=place.last {
                coverage[(slot - 1) as usize] += 1;
            }
        }
        // Every slot covered with multiplicity equal to its tie-group size.
        assert_eq!(coverage, vec![2, 2, 1]);
        assert_eq!(places[2], Placing { first: 3, last: 3 });
    }
}
