// Refresh worker: on every trigger (startup, fixed interval or cron schedule) run one
// refresh cycle per configured gateway. Cycles are detached tasks, so a slow backend
// never delays the next trigger; whichever cycle finishes last is what stays published.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};
use tracing::{Instrument, info, warn};

use crate::backend::{DeviceMetadataClient, StatsQueryClient};
use crate::pipeline::{GatewayPipelines, GatewayRegistry, RefreshOutcome};

/// Client, gateways, counters, and shutdown for the worker.
pub struct WorkerDeps<C> {
    pub client: Arc<C>,
    pub gateways: Arc<GatewayRegistry>,
    pub ws_clients: Arc<AtomicUsize>,
    pub stats: Arc<WorkerStats>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Trigger timing and logging config.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub interval_secs: u64,
    /// Cron expression (local time). Takes precedence over interval_secs.
    pub schedule: Option<String>,
    pub stats_log_interval_secs: u64,
}

#[derive(Debug, Default)]
pub struct WorkerStats {
    pub cycles_started: AtomicU64,
    pub refreshes_published: AtomicU64,
    pub refreshes_failed: AtomicU64,
    pub refreshes_superseded: AtomicU64,
}

impl WorkerStats {
    fn record(&self, outcome: &RefreshOutcome) {
        let counter = match outcome {
            RefreshOutcome::Published => &self.refreshes_published,
            RefreshOutcome::Superseded => &self.refreshes_superseded,
            RefreshOutcome::Kept(_) | RefreshOutcome::Aborted => &self.refreshes_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Outcomes of the three independent refreshes of one cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub throughput: RefreshOutcome,
    pub liveness: RefreshOutcome,
    pub device: RefreshOutcome,
}

/// Runs throughput, liveness and device refreshes as separate tasks and waits for all three.
/// Nothing here fails: every failure ends up as an outcome in the report.
pub async fn refresh_cycle<C>(
    gateway: Arc<GatewayPipelines>,
    client: Arc<C>,
    now: DateTime<Utc>,
) -> CycleReport
where
    C: StatsQueryClient + DeviceMetadataClient + 'static,
{
    let throughput = {
        let (g, c) = (gateway.clone(), client.clone());
        tokio::spawn(async move { g.throughput.refresh(c.as_ref(), g.id(), now).await })
    };
    let liveness = {
        let (g, c) = (gateway.clone(), client.clone());
        tokio::spawn(async move { g.liveness.refresh(c.as_ref(), g.id(), now).await })
    };
    let device = {
        let (g, c) = (gateway.clone(), client);
        tokio::spawn(async move { g.refresh_device(c.as_ref(), now).await })
    };

    let (throughput, liveness, device) = tokio::join!(throughput, liveness, device);
    CycleReport {
        throughput: joined(throughput, gateway.id(), "throughput"),
        liveness: joined(liveness, gateway.id(), "liveness"),
        device: joined(device, gateway.id(), "device"),
    }
}

fn joined(
    result: Result<RefreshOutcome, tokio::task::JoinError>,
    gateway_id: &str,
    task: &str,
) -> RefreshOutcome {
    result.unwrap_or_else(|e| {
        warn!(error = %e, gateway_id, task, "refresh task aborted");
        RefreshOutcome::Aborted
    })
}

pub fn spawn<C>(deps: WorkerDeps<C>, config: WorkerConfig) -> JoinHandle<()>
where
    C: StatsQueryClient + DeviceMetadataClient + 'static,
{
    let WorkerDeps {
        client,
        gateways,
        ws_clients,
        stats,
        mut shutdown_rx,
    } = deps;

    let worker_span = tracing::span!(
        tracing::Level::DEBUG,
        "refresh_worker",
        gateways = gateways.len()
    );

    tokio::spawn(
        async move {
            let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(1);
            let scheduler = tokio::spawn(refresh_scheduler(config.clone(), trigger_tx));

            let mut stats_log_tick = interval(Duration::from_secs(config.stats_log_interval_secs));
            stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    trigger = trigger_rx.recv() => {
                        if trigger.is_none() {
                            break;
                        }
                        let now = Utc::now();
                        for gateway in gateways.iter() {
                            stats.cycles_started.fetch_add(1, Ordering::Relaxed);
                            let (gateway, client, stats) = (gateway.clone(), client.clone(), stats.clone());
                            tokio::spawn(async move {
                                let report = refresh_cycle(gateway, client, now).await;
                                stats.record(&report.throughput);
                                stats.record(&report.liveness);
                                stats.record(&report.device);
                            });
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Refresh worker shutting down");
                        break;
                    }
                    _ = stats_log_tick.tick() => {
                        info!(
                            gateways = gateways.len(),
                            ws_clients = ws_clients.load(Ordering::Relaxed),
                            cycles_started = stats.cycles_started.load(Ordering::Relaxed),
                            refreshes_published = stats.refreshes_published.load(Ordering::Relaxed),
                            refreshes_failed = stats.refreshes_failed.load(Ordering::Relaxed),
                            refreshes_superseded = stats.refreshes_superseded.load(Ordering::Relaxed),
                            "app stats"
                        );
                    }
                }
            }
            scheduler.abort();
        }
        .instrument(worker_span),
    )
}

/// Sends one trigger immediately, then one per interval or cron occurrence (local time).
async fn refresh_scheduler(config: WorkerConfig, tx: mpsc::Sender<()>) {
    if tx.send(()).await.is_err() {
        return;
    }
    if let Some(ref cron_str) = config.schedule {
        let Ok(schedule) = cron::Schedule::from_str(cron_str) else {
            warn!(cron = %cron_str, "invalid refresh schedule; only the startup refresh ran");
            return;
        };
        loop {
            let now = chrono::Local::now();
            if let Some(next) = schedule.after(&now).next() {
                let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
                tokio::time::sleep(delay).await;
                if tx.send(()).await.is_err() {
                    break;
                }
            } else {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }
    } else {
        let mut tick = interval(Duration::from_secs(config.interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick completes immediately; the startup trigger already covered it.
        tick.tick().await;
        loop {
            tick.tick().await;
            if tx.send(()).await.is_err() {
                break;
            }
        }
    }
}
