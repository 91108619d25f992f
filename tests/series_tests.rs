// Chart series transforms: shape, ordering, labels, liveness heuristic

mod common;

use common::*;
use gateway_telemetry::models::ChartSeries;
use gateway_telemetry::series::{
    LabelTimezone, liveness, liveness_series, throughput, throughput_series,
};

const UTC: LabelTimezone = LabelTimezone::Utc;

fn data(chart: &ChartSeries, idx: usize) -> Vec<u64> {
    chart.series[idx].data.clone()
}

#[test]
fn throughput_two_days_example() {
    let rows = vec![day_row(1, 10, 5), day_row(2, 0, 0)];
    let chart = throughput_series(&rows, UTC);
    assert_eq!(chart.labels, vec!["1st", "2nd"]);
    assert_eq!(chart.series.len(), 2);
    assert_eq!(chart.series[0].name, "rx received");
    assert_eq!(chart.series[0].data, vec![10, 0]);
    assert_eq!(chart.series[1].name, "tx emitted");
    assert_eq!(chart.series[1].data, vec![5, 0]);
}

#[test]
fn throughput_lengths_match() {
    let rows: Vec<_> = (1..=30).map(|d| day_row(d, d as u64, 2 * d as u64)).collect();
    let chart = throughput_series(&rows, UTC);
    assert_eq!(chart.labels.len(), 30);
    assert_eq!(chart.series[0].data.len(), 30);
    assert_eq!(chart.series[1].data.len(), 30);
    assert!(chart.is_well_formed());
    assert_eq!(chart.labels[20], "21st");
    assert_eq!(chart.labels[21], "22nd");
    assert_eq!(chart.labels[22], "23rd");
    assert_eq!(chart.labels[10], "11th");
}

#[test]
fn throughput_reads_only_rx_ok_and_tx_emitted() {
    let rows = vec![row(at(2026, 3, 4, 0, 0), 100, 7, 200, 3)];
    let chart = throughput_series(&rows, UTC);
    assert_eq!(data(&chart, 0), vec![7]);
    assert_eq!(data(&chart, 1), vec![3]);
}

#[test]
fn throughput_series_order_is_fixed() {
    let a = throughput_series(&[], UTC);
    let b = throughput_series(&[day_row(5, 1, 1)], UTC);
    for chart in [a, b] {
        let names: Vec<_> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, throughput::SERIES_NAMES);
    }
}

#[test]
fn throughput_keeps_equal_timestamps() {
    let rows = vec![day_row(3, 1, 2), day_row(3, 4, 5)];
    let chart = throughput_series(&rows, UTC);
    assert_eq!(chart.labels, vec!["3rd", "3rd"]);
    assert_eq!(data(&chart, 0), vec![1, 4]);
    assert_eq!(data(&chart, 1), vec![2, 5]);
}

#[test]
fn throughput_empty_input_has_two_empty_series() {
    let chart = throughput_series(&[], UTC);
    assert!(chart.labels.is_empty());
    assert_eq!(chart.series.len(), 2);
    assert!(chart.series.iter().all(|s| s.data.is_empty()));
    assert_eq!(chart, throughput::empty());
}

#[test]
fn liveness_zero_row_is_offline_and_any_counter_is_online() {
    let ts = at(2026, 3, 31, 10, 0);
    let chart = liveness_series(&[row(ts, 0, 0, 0, 0)], UTC);
    assert_eq!(chart.series[0].data, vec![0]);

    let chart = liveness_series(&[row(ts, 0, 0, 0, 1)], UTC);
    assert_eq!(chart.series[0].data, vec![1]);

    for r in [
        row(ts, 1, 0, 0, 0),
        row(ts, 0, 1, 0, 0),
        row(ts, 0, 0, 1, 0),
        row(ts, 9, 9, 9, 9),
    ] {
        assert_eq!(liveness_series(&[r], UTC).series[0].data, vec![1]);
    }
}

#[test]
fn liveness_huge_counters_do_not_overflow() {
    let r = row(at(2026, 3, 31, 10, 0), u64::MAX, u64::MAX, 1, 1);
    assert_eq!(r.activity(), u64::MAX);
    assert_eq!(liveness_series(&[r], UTC).series[0].data, vec![1]);
}

#[test]
fn liveness_labels_are_hour_minute() {
    let rows = vec![
        row(at(2026, 3, 31, 9, 58), 0, 0, 0, 0),
        row(at(2026, 3, 31, 9, 59), 1, 0, 0, 0),
        row(at(2026, 3, 31, 10, 0), 0, 0, 0, 0),
    ];
    let chart = liveness_series(&rows, UTC);
    assert_eq!(chart.labels, vec!["9:58", "9:59", "10:00"]);
    assert_eq!(chart.series[0].data, vec![0, 1, 0]);
    assert_eq!(chart.series.len(), 1);
    assert_eq!(chart.series[0].name, "status");
}

#[test]
fn liveness_empty_input_has_one_empty_series() {
    let chart = liveness_series(&[], UTC);
    assert!(chart.labels.is_empty());
    assert_eq!(chart.series.len(), 1);
    assert!(chart.series[0].data.is_empty());
    assert_eq!(chart, liveness::empty());
}

#[test]
fn transforms_are_deterministic() {
    let rows = vec![day_row(1, 10, 5), day_row(2, 3, 0), day_row(3, 0, 8)];
    assert_eq!(throughput_series(&rows, UTC), throughput_series(&rows, UTC));
    assert_eq!(liveness_series(&rows, UTC), liveness_series(&rows, UTC));
}
