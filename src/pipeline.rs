// Scheduling shell around the pure series transforms.
// Each builder owns the latest published chart and nothing else. A refresh queries
// the backend, transforms synchronously, and atomically replaces the published value.
// On any failure the previous value stays published. A result issued before the
// currently published one (older `now`) is discarded when it completes late.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::backend::{DeviceMetadataClient, StatsError, StatsQueryClient};
use crate::models::{ChartSeries, DeviceContext, Interval, StatRow};
use crate::series::{self, LabelTimezone, liveness, throughput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Throughput,
    Liveness,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Throughput => "throughput",
            ChartKind::Liveness => "liveness",
        }
    }

    pub fn interval(&self) -> Interval {
        match self {
            ChartKind::Throughput => throughput::INTERVAL,
            ChartKind::Liveness => liveness::INTERVAL,
        }
    }

    /// Correctly shaped chart with no points.
    pub fn empty(&self) -> ChartSeries {
        match self {
            ChartKind::Throughput => throughput::empty(),
            ChartKind::Liveness => liveness::empty(),
        }
    }

    pub fn build(&self, rows: &[StatRow], tz: LabelTimezone) -> ChartSeries {
        match self {
            ChartKind::Throughput => series::throughput_series(rows, tz),
            ChartKind::Liveness => series::liveness_series(rows, tz),
        }
    }
}

/// Result of one refresh attempt. Failures are values here, never panics or propagated errors.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Published,
    /// Previous value kept because the fetch failed.
    Kept(StatsError),
    /// Fetch succeeded but a refresh issued later had already published.
    Superseded,
    /// The refresh task itself died (panic or runtime shutdown).
    Aborted,
}

impl RefreshOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, RefreshOutcome::Published)
    }
}

/// Issue time of the published value, in microseconds since the epoch.
/// Only read and written while the owning watch channel's write lock is held.
struct IssueMark(AtomicI64);

impl IssueMark {
    fn new() -> Self {
        Self(AtomicI64::new(i64::MIN))
    }

    /// Records `now` and returns true unless something issued later is already published.
    fn admit(&self, now: DateTime<Utc>) -> bool {
        let issued = now.timestamp_micros();
        if issued < self.0.load(Ordering::Relaxed) {
            return false;
        }
        self.0.store(issued, Ordering::Relaxed);
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub throughput_window: TimeDelta,
    pub liveness_window: TimeDelta,
    pub label_timezone: LabelTimezone,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            throughput_window: TimeDelta::days(30),
            liveness_window: TimeDelta::hours(2),
            label_timezone: LabelTimezone::Local,
        }
    }
}

pub struct SeriesBuilder {
    kind: ChartKind,
    window: TimeDelta,
    tz: LabelTimezone,
    published: watch::Sender<Arc<ChartSeries>>,
    issued: IssueMark,
}

impl SeriesBuilder {
    pub fn new(kind: ChartKind, window: TimeDelta, tz: LabelTimezone) -> Self {
        let (published, _) = watch::channel(Arc::new(kind.empty()));
        Self {
            kind,
            window,
            tz,
            published,
            issued: IssueMark::new(),
        }
    }

    /// Day-granularity rx/tx chart over `window` (30 days by default).
    pub fn throughput(window: TimeDelta, tz: LabelTimezone) -> Self {
        Self::new(ChartKind::Throughput, window, tz)
    }

    /// Minute-granularity status chart over `window` (2 hours by default).
    pub fn liveness(window: TimeDelta, tz: LabelTimezone) -> Self {
        Self::new(ChartKind::Liveness, window, tz)
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Query window ending at `now`; an error when the start falls outside chrono's range.
    pub fn window(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), StatsError> {
        let start = now
            .checked_sub_signed(self.window)
            .ok_or(StatsError::WindowOutOfRange {
                window: self.window,
                end: now,
            })?;
        Ok((start, now))
    }

    /// Latest published chart (empty until the first successful refresh).
    pub fn latest(&self) -> Arc<ChartSeries> {
        self.published.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ChartSeries>> {
        self.published.subscribe()
    }

    /// Query, transform, publish. `now` orders refreshes: the latest-issued result wins
    /// regardless of completion order.
    #[instrument(skip(self, client), fields(chart = self.kind.as_str()))]
    pub async fn refresh<C: StatsQueryClient>(
        &self,
        client: &C,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        let rows = match self.window(now) {
            Ok((start, end)) => client.query(device_id, self.kind.interval(), start, end).await,
            Err(e) => Err(e),
        };
        match rows {
            Ok(rows) => {
                let chart = Arc::new(self.kind.build(&rows, self.tz));
                let points = chart.len();
                let published = self.published.send_if_modified(|current| {
                    if !self.issued.admit(now) {
                        return false;
                    }
                    *current = chart;
                    true
                });
                if published {
                    debug!(points, "chart published");
                    RefreshOutcome::Published
                } else {
                    debug!("newer chart already published; discarding late result");
                    RefreshOutcome::Superseded
                }
            }
            Err(e) => {
                warn!(error = %e, operation = "query_stats", "keeping previous chart");
                RefreshOutcome::Kept(e)
            }
        }
    }
}

/// What the renderer gets for one gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayView {
    pub device: Option<Arc<DeviceContext>>,
    pub throughput: Arc<ChartSeries>,
    pub liveness: Arc<ChartSeries>,
}

/// Both chart pipelines plus pass-through device context for one gateway.
pub struct GatewayPipelines {
    id: String,
    pub throughput: SeriesBuilder,
    pub liveness: SeriesBuilder,
    device: watch::Sender<Option<Arc<DeviceContext>>>,
    device_issued: IssueMark,
}

impl GatewayPipelines {
    pub fn new(id: impl Into<String>, settings: &PipelineSettings) -> Self {
        let (device, _) = watch::channel(None);
        Self {
            id: id.into(),
            throughput: SeriesBuilder::throughput(
                settings.throughput_window,
                settings.label_timezone,
            ),
            liveness: SeriesBuilder::liveness(settings.liveness_window, settings.label_timezone),
            device,
            device_issued: IssueMark::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn device(&self) -> Option<Arc<DeviceContext>> {
        self.device.borrow().clone()
    }

    pub fn subscribe_device(&self) -> watch::Receiver<Option<Arc<DeviceContext>>> {
        self.device.subscribe()
    }

    /// Same policy as the charts: a failed fetch keeps the last context and a late
    /// result issued before the published one is discarded.
    #[instrument(skip(self, client), fields(gateway_id = %self.id))]
    pub async fn refresh_device<C: DeviceMetadataClient>(
        &self,
        client: &C,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        match client.fetch_device(&self.id).await {
            Ok(ctx) => {
                let ctx = Arc::new(ctx);
                let published = self.device.send_if_modified(|current| {
                    if !self.device_issued.admit(now) {
                        return false;
                    }
                    *current = Some(ctx);
                    true
                });
                if published {
                    RefreshOutcome::Published
                } else {
                    RefreshOutcome::Superseded
                }
            }
            Err(e) => {
                warn!(error = %e, operation = "fetch_device", "keeping previous device context");
                RefreshOutcome::Kept(e)
            }
        }
    }

    pub fn view(&self) -> GatewayView {
        GatewayView {
            device: self.device(),
            throughput: self.throughput.latest(),
            liveness: self.liveness.latest(),
        }
    }
}

/// Configured gateways, keyed by id.
pub struct GatewayRegistry {
    gateways: BTreeMap<String, Arc<GatewayPipelines>>,
}

impl GatewayRegistry {
    pub fn new<I, S>(ids: I, settings: &PipelineSettings) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let gateways = ids
            .into_iter()
            .map(|id| {
                let g = GatewayPipelines::new(id, settings);
                (g.id().to_string(), Arc::new(g))
            })
            .collect();
        Self { gateways }
    }

    pub fn get(&self, id: &str) -> Option<Arc<GatewayPipelines>> {
        self.gateways.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        self.gateways.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<GatewayPipelines>> {
        self.gateways.values()
    }

    pub fn len(&self) -> usize {
        self.gateways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
    }
}
