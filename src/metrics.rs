use crate::error::StatsError;
use crate::types::{PullRequestRecord, WEEKDAY_LABELS};
use chrono::Weekday;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Occurrence counts keyed by an integer bucket, kept in ascending key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Histogram(BTreeMap<i64, usize>);

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: i64) {
        *self.0.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: i64) -> Option<usize> {
        self.0.get(&key).copied()
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Inserts a zero entry for every key in `range` that has not been seen,
    /// so the rendered chart has no gaps.
    pub fn fill_gaps(&mut self, range: RangeInclusive<i64>) {
        for key in range {
            self.0.entry(key).or_insert(0);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, usize)> + '_ {
        self.0.iter().map(|(key, count)| (*key, *count))
    }
}

/// Occurrence counts per day of week. All seven days are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekdayHistogram([usize; 7]);

impl WeekdayHistogram {
    pub fn record(&mut self, day: Weekday) {
        self.0[day.num_days_from_monday() as usize] += 1;
    }

    pub fn get(&self, day: Weekday) -> usize {
        self.0[day.num_days_from_monday() as usize]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Yields `(label, count)` pairs from Monday to Sunday.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        WEEKDAY_LABELS.iter().copied().zip(self.0.iter().copied())
    }
}

impl Serialize for WeekdayHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(WEEKDAY_LABELS.len()))?;
        for (label, count) in self.iter() {
            map.serialize_entry(label, &count)?;
        }
        map.end()
    }
}

/// Everything gathered from a single pass over a repository's closed pull requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateState {
    /// Number of closed pull requests ingested.
    pub total_count: usize,
    /// How many of those were merged.
    pub merged_count: usize,
    /// Days each pull request stayed open, in ingestion order.
    pub days_open_series: Vec<i64>,
    /// Comment count of each pull request, in ingestion order.
    pub comments_series: Vec<i64>,
    pub days_open_histogram: Histogram,
    pub comments_histogram: Histogram,
    pub created_weekdays: WeekdayHistogram,
    pub closed_weekdays: WeekdayHistogram,
}

/// Folds pull request records into an [`AggregateState`], one record at a time.
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    state: AggregateState,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single closed pull request to the running aggregates.
    ///
    /// A record that closes before it was created is rejected and leaves the
    /// aggregates untouched.
    pub fn ingest(&mut self, record: &PullRequestRecord) -> Result<(), StatsError> {
        if record.closed_at < record.created_at {
            return Err(StatsError::InvalidRecord {
                number: record.number,
                created_at: record.created_at,
                closed_at: record.closed_at,
            });
        }

        let days_open = record.days_open();
        let comments = i64::from(record.comment_count);
        let state = &mut self.state;

        state.total_count += 1;
        if record.is_merged {
            state.merged_count += 1;
        }
        state.days_open_series.push(days_open);
        state.days_open_histogram.record(days_open);
        state.comments_series.push(comments);
        state.comments_histogram.record(comments);
        state.created_weekdays.record(record.created_weekday());
        state.closed_weekdays.record(record.closed_weekday());

        Ok(())
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    /// Ends ingestion and hands over the collected aggregates.
    pub fn finish(self) -> AggregateState {
        self.state
    }
}

/// Descriptive statistics of an integer series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (divisor N).
    pub std_dev: f64,
    pub min: i64,
    pub max: i64,
}

/// Calculates mean, median, population standard deviation, min and max.
///
/// # Arguments
/// * `subject` - Name of the series, reported when it is empty.
/// * `series` - The values to summarize, in any order.
///
/// # Errors
/// Returns [`StatsError::EmptySeries`] when `series` has no values.
pub fn summarize(subject: &'static str, series: &[i64]) -> Result<SummaryStats, StatsError> {
    let mut sorted = series.to_vec();
    sorted.sort_unstable();

    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Err(StatsError::EmptySeries { subject });
    };

    let n = sorted.len() as f64;
    let mean = sorted.iter().map(|&x| x as f64).sum::<f64>() / n;

    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    };

    let variance = sorted
        .iter()
        .map(|&x| {
            let delta = x as f64 - mean;
            delta * delta
        })
        .sum::<f64>()
        / n;

    Ok(SummaryStats {
        mean,
        median,
        std_dev: variance.sqrt(),
        min,
        max,
    })
}

/// Which formula produces the merge percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeRateFormula {
    /// `100 * merged / total`.
    #[default]
    Corrected,
    /// `100 - total / merged`, as the first releases of the tool printed it.
    Legacy,
}

/// Share of closed pull requests that were merged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MergeRate {
    pub merged: usize,
    pub total: usize,
    pub formula: MergeRateFormula,
    /// Rounded to two decimals; `None` when the formula would divide by zero.
    pub percentage: Option<f64>,
}

impl MergeRate {
    pub fn new(merged: usize, total: usize, formula: MergeRateFormula) -> Self {
        let raw = match formula {
            MergeRateFormula::Corrected if total > 0 => Some(100.0 * merged as f64 / total as f64),
            MergeRateFormula::Legacy if merged > 0 => Some(100.0 - total as f64 / merged as f64),
            _ => None,
        };

        Self {
            merged,
            total,
            formula,
            percentage: raw.map(|p| (p * 100.0).round() / 100.0),
        }
    }

    pub fn from_state(state: &AggregateState, formula: MergeRateFormula) -> Self {
        Self::new(state.merged_count, state.total_count, formula)
    }
}
