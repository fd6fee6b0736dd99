//! Errors raised by the statistics pipeline itself.
//!
//! Network, authentication and configuration failures travel as `anyhow::Error`
//! with context attached; only conditions the aggregation code can detect on its
//! own get a dedicated variant here.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    /// The record closes before it was created.
    #[error("pull request #{number} closed at {closed_at} before it was created at {created_at}")]
    InvalidRecord {
        number: u64,
        created_at: DateTime<Utc>,
        closed_at: DateTime<Utc>,
    },

    /// A summary was requested for a series with no values.
    #[error("cannot summarize an empty {subject} series")]
    EmptySeries { subject: &'static str },
}
