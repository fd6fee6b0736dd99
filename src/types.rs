use chrono::{DateTime, Datelike, Utc, Weekday};

/// Day labels in Monday-first order, indexed by days from Monday.
pub const WEEKDAY_LABELS: [&str; 7] = ["M", "T", "W", "R", "F", "Sa", "Su"];

/// A closed pull request, reduced to the fields the statistics need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub is_merged: bool,
    pub comment_count: u32,
}

impl PullRequestRecord {
    /// Whole days between creation and closure, truncated.
    pub fn days_open(&self) -> i64 {
        (self.closed_at - self.created_at).num_days()
    }

    pub fn created_weekday(&self) -> Weekday {
        self.created_at.weekday()
    }

    pub fn closed_weekday(&self) -> Weekday {
        self.closed_at.weekday()
    }
}
