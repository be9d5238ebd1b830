//! Top-level error type for `region_odds`
use crate::fixture::FixtureError;
use crate::game::ScoreError;
use thiserror::Error;

/// Top-level error type for `region_odds`
#[derive(Error, Debug, Clone)]
pub enum OddsError {
    #[error("fixture error: {0}")]
    Fixture(#[from] FixtureError),
    #[error("score error: {0}")]
    Score(#[from] ScoreError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
