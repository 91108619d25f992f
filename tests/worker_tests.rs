// Refresh worker: startup cycle publishes, failures are counted, shutdown stops the loop

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use gateway_telemetry::backend::StatsError;
use gateway_telemetry::models::Interval;
use gateway_telemetry::pipeline::{GatewayRegistry, PipelineSettings, RefreshOutcome};
use gateway_telemetry::series::LabelTimezone;
use gateway_telemetry::worker::{
    WorkerConfig, WorkerDeps, WorkerStats, refresh_cycle, spawn,
};

fn registry(ids: &[&str]) -> Arc<GatewayRegistry> {
    let settings = PipelineSettings {
        label_timezone: LabelTimezone::Utc,
        ..PipelineSettings::default()
    };
    Arc::new(GatewayRegistry::new(ids.iter().copied(), &settings))
}

#[tokio::test]
async fn refresh_cycle_reports_each_pipeline() {
    let client = Arc::new(StubClient::with_rows(Interval::Day, vec![day_row(1, 10, 5)]));
    client.set_error(Interval::Minute, StatsError::Query("down".into()));
    client.set_device(Ok(device("gw1")));
    let gateways = registry(&["gw1"]);
    let gw1 = gateways.get("gw1").unwrap();

    let report = refresh_cycle(gw1.clone(), client.clone(), now()).await;
    assert!(report.throughput.is_published());
    assert!(matches!(report.liveness, RefreshOutcome::Kept(StatsError::Query(_))));
    assert!(report.device.is_published());

    assert_eq!(gw1.throughput.latest().labels, vec!["1st"]);
    assert!(gw1.liveness.latest().is_empty());
    assert_eq!(gw1.device().unwrap().id, "gw1");
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn refresh_cycle_with_unknown_device_keeps_empty_charts() {
    let client = Arc::new(StubClient::new());
    for interval in [Interval::Day, Interval::Minute] {
        client.set_error(interval, StatsError::NotFound("gw1".into()));
    }
    let gateways = registry(&["gw1"]);
    let gw1 = gateways.get("gw1").unwrap();

    let report = refresh_cycle(gw1.clone(), client, now()).await;
    assert!(!report.throughput.is_published());
    assert!(!report.liveness.is_published());
    assert!(!report.device.is_published());
    assert_eq!(gw1.throughput.latest().series.len(), 2);
    assert_eq!(gw1.liveness.latest().series.len(), 1);
}

#[tokio::test]
async fn worker_runs_startup_cycle_and_shuts_down() {
    let client = Arc::new(StubClient::with_rows(
        Interval::Day,
        vec![day_row(1, 10, 5), day_row(2, 0, 0)],
    ));
    client.set_device(Err(StatsError::Query("metadata down".into())));
    let gateways = registry(&["gw1", "gw2"]);
    let stats = Arc::new(WorkerStats::default());
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            client: client.clone(),
            gateways: gateways.clone(),
            ws_clients: Arc::new(AtomicUsize::new(0)),
            stats: stats.clone(),
            shutdown_rx,
        },
        WorkerConfig {
            interval_secs: 3600,
            schedule: None,
            stats_log_interval_secs: 3600,
        },
    );

    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    let _ = shutdown_tx.send(());
    handle.await.unwrap();

    assert_eq!(stats.cycles_started.load(Ordering::Relaxed), 2);
    // Per gateway: throughput + liveness published, device failed.
    assert_eq!(stats.refreshes_published.load(Ordering::Relaxed), 4);
    assert_eq!(stats.refreshes_failed.load(Ordering::Relaxed), 2);
    for id in ["gw1", "gw2"] {
        let gw = gateways.get(id).unwrap();
        assert_eq!(gw.throughput.latest().labels, vec!["1st", "2nd"]);
        assert!(gw.device().is_none());
    }
    assert_eq!(client.calls().len(), 4);
}
