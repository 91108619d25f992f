// Short-range liveness: 1 for each minute bucket with any reported activity, else 0.
// An all-zero bucket may be a quiet report or no report at all; both map to 0.

use crate::models::{ChartSeries, Interval, StatRow};

use super::labels::{LabelTimezone, time_of_day_label};

pub const STATUS: &str = "status";

pub const SERIES_NAMES: [&str; 1] = [STATUS];

pub const INTERVAL: Interval = Interval::Minute;

pub fn empty() -> ChartSeries {
    ChartSeries::empty(&SERIES_NAMES)
}

pub fn is_active(row: &StatRow) -> bool {
    row.activity() > 0
}

pub fn liveness_series(rows: &[StatRow], tz: LabelTimezone) -> ChartSeries {
    let mut chart = ChartSeries::with_capacity(&SERIES_NAMES, rows.len());
    for row in rows {
        chart.push(
            time_of_day_label(&row.timestamp, tz),
            [u64::from(is_active(row))],
        );
    }
    chart
}
