//! # Trial driver
//!
//! Trials are independent, so the driver splits them into contiguous ranges
//! over a fixed pool of worker threads. Every trial seeds its own RNG from
//! `master_seed + trial_index`, which makes the sampled outcomes a property
//! of the trial, not of the worker that happened to run it: the merged
//! counts are byte-identical for any worker count.
//!
//! Workers share the immutable fixtures and the completed-games seed state
//! read-only. Each owns a private scratch [`SimState`], a places buffer and
//! an [`OddsAccumulator`]; the driver merges the accumulators at the end.
//!
//! Cancellation is cooperative and checked between trials. A cancelled run
//! reports how many trials finished; per-trial interruption is not offered
//! because a trial is short.
use crate::fixture::Fixtures;
use crate::game::GameResult;
use crate::odds::OddsAccumulator;
use crate::sim::sampler::sample_game;
use crate::sim::SimState;
use crate::standings::order::{assign_places_into, Placing};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::debug;

/// Shared cooperative cancellation signal.
///
/// Cloning shares the flag. Cancelling an idle or finished run is harmless.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Run `trials` trials over `workers` threads and merge the counts.
///
/// Returns the merged accumulator and the number of trials completed,
/// which is short of `trials` only if `cancel` was raised.
pub(crate) fn run_trials(
    fixtures: &Fixtures,
    trials: u32,
    master_seed: u64,
    workers: usize,
    cancel: &CancelFlag,
) -> (OddsAccumulator, u32) {
    let seed_state = SimState::seeded_from(fixtures);
    if workers <= 1 {
        return run_range(fixtures, &seed_state, 0..trials, master_seed, cancel);
    }
    let seed_state = &seed_state;
    thread::scope(|scope| {
        let handles: Vec<_> = split_ranges(trials, workers)
            .into_iter()
            .map(|range| {
                debug!(start = range.start, end = range.end, "spawning worker");
                scope.spawn(move || run_range(fixtures, seed_state, range, master_seed, cancel))
            })
            .collect();
        let mut merged = OddsAccumulator::new(fixtures.roster().len());
        let mut completed = 0;
        for handle in handles {
            let (acc, count) = handle.join().expect("simulation worker panicked");
            merged.merge(&acc);
            completed += count;
        }
        (merged, completed)
    })
}

/// Contiguous, near-even trial ranges, one per worker.
fn split_ranges(trials: u32, workers: usize) -> Vec<Range<u32>> {
    let workers = workers.min(trials as usize).max(1) as u32;
    let base = trials / workers;
    let extra = trials % workers;
    let mut ranges = Vec::with_capacity(workers as usize);
    let mut start = 0;
    for worker in 0..workers {
        let len = base + u32::from(worker < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

fn run_range(
    fixtures: &Fixtures,
    seed_state: &SimState,
    range: Range<u32>,
    master_seed: u64,
    cancel: &CancelFlag,
) -> (OddsAccumulator, u32) {
    let n = fixtures.roster().len();
    let mut acc = OddsAccumulator::new(n);
    let mut state = seed_state.clone();
    let mut places: Vec<Placing> = Vec::with_capacity(n);
    let mut completed = 0;
    for trial in range {
        if cancel.is_cancelled() {
            break;
        }
        let mut rng = StdRng::seed_from_u64(master_seed.wrapping_add(u64::from(trial)));
        state.clone_from(seed_state);
        for pair in fixtures.remaining() {
            let game = sample_game(&mut rng);
            let (res_a, points_a, points_b) = if game.a_won {
                (GameResult::Win, game.winner_points, game.loser_points)
            } else {
                (GameResult::Loss, game.loser_points, game.winner_points)
            };
            state.record_pair(pair.a, pair.b, res_a, points_a, points_b);
        }
        assign_places_into(state.lines(), state.h2h(), &mut places);
        acc.credit(&places);
        completed += 1;
    }
    (acc, completed)
}
