//! # Engine entry points
//!
//! The crate's public surface: compute playoff odds for a region from a
//! frozen snapshot, or rank its current standings deterministically. No
//! I/O happens here; ingestion and persistence are the caller's business.
use crate::config::SimConfig;
use crate::error::OddsError;
use crate::fixture::Fixtures;
use crate::game::GameRecord;
use crate::odds::{finalize_rows, OddsReport};
use crate::school::{RegionKey, SchoolName, SchoolRecord};
use crate::sim::driver::{run_trials, CancelFlag};
use crate::sim::SimState;
use crate::standings::order::{assign_places, Placing};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Simulate the region and return renormalized playoff odds.
///
/// Equivalent to [`compute_region_odds_with_cancel`] with a flag nobody
/// raises.
pub fn compute_region_odds(
    schools: &[SchoolRecord],
    games: &[GameRecord],
    cfg: &SimConfig,
) -> Result<OddsReport, OddsError> {
    compute_region_odds_with_cancel(schools, games, cfg, &CancelFlag::new())
}

/// Simulate the region, honoring a cooperative cancellation flag.
///
/// A raised flag stops the run between trials; the report then carries
/// partial odds over the trials completed, with `cancelled` set.
///
/// # Errors
///
/// Input validation fails the run before any trial starts: a bad trial
/// count is [`OddsError::InvalidInput`]; snapshot defects surface as
/// [`OddsError::Fixture`].
pub fn compute_region_odds_with_cancel(
    schools: &[SchoolRecord],
    games: &[GameRecord],
    cfg: &SimConfig,
    cancel: &CancelFlag,
) -> Result<OddsReport, OddsError> {
    if cfg.trials < 1 {
        return Err(OddsError::InvalidInput(format!(
            "trials must be at least 1, got {}",
            cfg.trials
        )));
    }
    let fixtures = Fixtures::try_new(schools, games, cfg.region_key())?;
    let seed = cfg.rng_seed.unwrap_or_else(rand::random);
    let workers = cfg
        .workers
        .unwrap_or_else(num_cpus::get)
        .clamp(1, cfg.trials as usize);
    info!(
        region = %cfg.region_key(),
        schools = fixtures.roster().len(),
        remaining = fixtures.remaining().count(),
        trials = cfg.trials,
        workers,
        seed,
        "starting region simulation"
    );
    let (acc, completed) = run_trials(&fixtures, cfg.trials, seed, workers, cancel);
    let cancelled = completed < cfg.trials;
    if cancelled {
        warn!(
            completed,
            requested = cfg.trials,
            "run cancelled, returning partial odds"
        );
    } else {
        info!(completed, "region simulation finished");
    }
    let rows = finalize_rows(&acc, fixtures.roster(), completed);
    Ok(OddsReport {
        rows,
        seed,
        trials_requested: cfg.trials,
        trials_completed: completed,
        cancelled,
    })
}

/// A school's slot range in the current standings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RankedSchool {
    pub school: SchoolName,
    pub placing: Placing,
}

/// Rank a region's current standings without simulating.
///
/// Only completed games count; remaining pairs are ignored. On a fully
/// played schedule this is the final ordering, and it is deterministic:
/// repeated calls return identical rankings.
pub fn rank_region(
    schools: &[SchoolRecord],
    games: &[GameRecord],
    key: RegionKey,
) -> Result<Vec<RankedSchool>, OddsError> {
    let fixtures = Fixtures::try_new(schools, games, key)?;
    let state = SimState::seeded_from(&fixtures);
    let places = assign_places(state.lines(), state.h2h());
    let roster = fixtures.roster();
    Ok(roster
        .ids()
        .map(|id| RankedSchool {
            school: roster.name(id).clone(),
            placing: places[id.idx()],
        })
        .sorted_by(|x, y| {
            x.placing
                .first
                .cmp(&y.placing.first)
                .then(x.school.cmp(&y.school))
        })
        .collect())
}
