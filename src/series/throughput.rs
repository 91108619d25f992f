// Long-range throughput: frames received OK vs frames emitted, one point per day.

use crate::models::{ChartSeries, Interval, StatRow};

use super::labels::{LabelTimezone, ordinal_day_label};

pub const RX_RECEIVED: &str = "rx received";
pub const TX_EMITTED: &str = "tx emitted";

/// Series order is fixed: rx first, tx second.
pub const SERIES_NAMES: [&str; 2] = [RX_RECEIVED, TX_EMITTED];

pub const INTERVAL: Interval = Interval::Day;

pub fn empty() -> ChartSeries {
    ChartSeries::empty(&SERIES_NAMES)
}

/// One point per row, in row order. Rows with equal timestamps are kept as-is.
pub fn throughput_series(rows: &[StatRow], tz: LabelTimezone) -> ChartSeries {
    let mut chart = ChartSeries::with_capacity(&SERIES_NAMES, rows.len());
    for row in rows {
        chart.push(
            ordinal_day_label(&row.timestamp, tz),
            [row.rx_packets_received_ok, row.tx_packets_emitted],
        );
    }
    chart
}
