//! Text and JSON rendering of the pull request statistics.
//!
//! Histograms are drawn as horizontal bars: one row per bucket, in the order the
//! caller supplies them, with the raw count and bucket label after the bar.

use crate::error::StatsError;
use crate::metrics::{
    summarize, AggregateState, Histogram, MergeRate, MergeRateFormula, SummaryStats,
    WeekdayHistogram,
};
use serde::Serialize;
use std::fmt::Display;

const BAR_CHAR: char = '█';
const RULE_CHAR: char = '#';
const COLUMN_GAP: &str = "  ";

/// Summary statistics of a numeric series together with its gap-filled histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesReport {
    pub summary: SummaryStats,
    pub histogram: Histogram,
}

impl SeriesReport {
    /// Summarizes `series` and fills the histogram over `[min, max]`.
    pub fn build(
        subject: &'static str,
        series: &[i64],
        mut histogram: Histogram,
    ) -> Result<Self, StatsError> {
        let summary = summarize(subject, series)?;
        histogram.fill_gaps(summary.min..=summary.max);
        Ok(Self { summary, histogram })
    }
}

/// The complete statistics report for one repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub repository: String,
    pub merge_rate: MergeRate,
    pub days_open: SeriesReport,
    pub comments: SeriesReport,
    pub day_of_week_created: WeekdayHistogram,
    pub day_of_week_closed: WeekdayHistogram,
}

impl Report {
    /// Reduces a finished [`AggregateState`] into a report.
    ///
    /// Fails with [`StatsError::EmptySeries`] when nothing was ingested.
    pub fn from_state(
        repository: impl Into<String>,
        state: AggregateState,
        formula: MergeRateFormula,
    ) -> Result<Self, StatsError> {
        let merge_rate = MergeRate::from_state(&state, formula);
        let days_open = SeriesReport::build(
            "days open",
            &state.days_open_series,
            state.days_open_histogram,
        )?;
        let comments = SeriesReport::build(
            "comments",
            &state.comments_series,
            state.comments_histogram,
        )?;

        Ok(Self {
            repository: repository.into(),
            merge_rate,
            days_open,
            comments,
            day_of_week_created: state.created_weekdays,
            day_of_week_closed: state.closed_weekdays,
        })
    }

    /// Renders the report in the standard output order.
    pub fn render_text(&self, width: usize) -> String {
        let mut lines = vec![render_merge_line(&self.merge_rate)];

        lines.push(render_summary_line("Days open", &self.days_open.summary));
        lines.extend(render_histogram(
            "Days Open",
            self.days_open.histogram.iter(),
            width,
        ));

        lines.push(render_summary_line("Comments", &self.comments.summary));
        lines.extend(render_histogram(
            "Comments",
            self.comments.histogram.iter(),
            width,
        ));

        lines.extend(render_histogram(
            "Day of Week Created",
            self.day_of_week_created.iter(),
            width,
        ));
        lines.extend(render_histogram(
            "Day of Week Closed",
            self.day_of_week_closed.iter(),
            width,
        ));

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Formats the merge-rate line, e.g. `70.00% (7 of 10) closed pulls merged.`
pub fn render_merge_line(rate: &MergeRate) -> String {
    let percentage = rate
        .percentage
        .map_or_else(|| "n/a".to_string(), |p| format!("{p:.2}"));
    format!(
        "{percentage}% ({} of {}) closed pulls merged.",
        rate.merged, rate.total
    )
}

pub fn render_summary_line(subject: &str, stats: &SummaryStats) -> String {
    format!(
        "{subject}: {:.2} (mean) {:.2} (median) {:.2} (std. dev.) {} (min) {} (max)",
        stats.mean, stats.median, stats.std_dev, stats.min, stats.max
    )
}

/// Draws a horizontal bar chart.
///
/// # Arguments
/// * `title` - Printed above the chart, followed by a `#` rule.
/// * `rows` - `(label, count)` pairs, drawn top to bottom in iteration order.
/// * `width` - Length of the bar for the largest count.
pub fn render_histogram<I, L>(title: &str, rows: I, width: usize) -> Vec<String>
where
    I: IntoIterator<Item = (L, usize)>,
    L: Display,
{
    let rows: Vec<(String, usize)> = rows
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();

    let max_count = rows.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let count_width = max_count.to_string().len();
    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let line_width = width + COLUMN_GAP.len() * 2 + count_width + label_width;

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(title.to_string());
    lines.push(RULE_CHAR.to_string().repeat(line_width));

    for (label, count) in rows {
        let bar_len = if max_count == 0 {
            0
        } else {
            count * width / max_count
        };
        let bar = BAR_CHAR.to_string().repeat(bar_len);
        let padding = " ".repeat(width - bar_len);
        lines.push(format!(
            "{bar}{padding}{COLUMN_GAP}{count:>count_width$}{COLUMN_GAP}{label}"
        ));
    }

    lines
}
