//! # Per-trial simulation state
//!
//! A trial needs exactly two mutable things: the per-school [`TeamLine`]s
//! and the head-to-head table. Both live in [`SimState`], which is cloned
//! from a completed-games seed at the start of every trial (`clone_from`
//! reuses the buffers, so the hot loop never reallocates).
pub mod driver;
pub mod sampler;

use crate::fixture::Fixtures;
use crate::game::{GameResult, ScorePoints};
use crate::school::SchoolId;
use crate::standings::h2h::H2hTable;
use crate::standings::TeamLine;

/// Mutable scratch state of one trial.
#[derive(Debug, Clone)]
pub struct SimState {
    lines: Vec<TeamLine>,
    h2h: H2hTable,
}

impl SimState {
    pub fn new(n: usize) -> Self {
        Self {
            lines: vec![TeamLine::default(); n],
            h2h: H2hTable::new(n),
        }
    }

    /// State with all completed pairs already folded in.
    ///
    /// Workers clone this once per trial and layer sampled results on top.
    pub fn seeded_from(fixtures: &Fixtures) -> Self {
        let mut state = Self::new(fixtures.roster().len());
        for pair in fixtures.completed() {
            state.record_pair(pair.a, pair.b, pair.res_a, pair.points_a, pair.points_b);
        }
        state
    }

    /// Fold one decided pair into lines and head-to-head, both sides.
    pub fn record_pair(
        &mut self,
        a: SchoolId,
        b: SchoolId,
        res_a: GameResult,
        points_a: ScorePoints,
        points_b: ScorePoints,
    ) {
        self.lines[a.idx()].record(res_a, points_b);
        self.lines[b.idx()].record(res_a.invert(), points_a);
        self.h2h.record(a, b, res_a, points_a - points_b);
    }

    pub fn lines(&self) -> &[TeamLine] {
        &self.lines
    }

    pub fn h2h(&self) -> &H2hTable {
        &self.h2h
    }
}
