#![forbid(unsafe_code)]
#![warn(
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]
//! # region_odds
//!
//! Playoff odds for a regional round-robin of a high-school football
//! league. Given a frozen snapshot of schools and games, the engine
//! simulates completions of the remaining schedule, applies the league's
//! five-step tiebreak to order every trial into finishing slots 1..N, and
//! aggregates per-slot counts into renormalized playoff odds with
//! clinched/eliminated flags.
//!
//! The crate is the Monte Carlo core only: inputs arrive as in-memory
//! values and results leave the same way. Scraping, storage and any UI live
//! with the caller.
//!
//! ```
//! use region_odds::{compute_region_odds, SimConfig};
//! use region_odds::game::GameRecord;
//! use region_odds::school::SchoolRecord;
//!
//! let schools: Vec<SchoolRecord> = ["Amory", "Corinth", "Oxford", "Tupelo"]
//!     .iter()
//!     .map(|name| SchoolRecord::new(*name, 3, 2, 2024))
//!     .collect();
//! let games = vec![
//!     GameRecord::scheduled("Amory", "Corinth", 2024, true),
//!     GameRecord::scheduled("Oxford", "Tupelo", 2024, true),
//! ];
//! let mut cfg = SimConfig::new(3, 2, 2024);
//! cfg.trials = 1_000;
//! cfg.rng_seed = Some(1);
//! let report = compute_region_odds(&schools, &games, &cfg).unwrap();
//! assert_eq!(report.rows.len(), 4);
//! ```
pub mod config;
pub mod engine;
pub mod error;
pub mod fixture;
pub mod game;
pub mod odds;
pub mod school;
pub mod sim;
pub mod standings;

pub use config::SimConfig;
pub use engine::{compute_region_odds, compute_region_odds_with_cancel, rank_region, RankedSchool};
pub use error::OddsError;
pub use odds::{OddsReport, OddsRow};
pub use sim::driver::CancelFlag;
