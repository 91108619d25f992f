// Shared test helpers: stat row builders and an in-memory stats backend

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use gateway_telemetry::backend::{DeviceMetadataClient, StatsError, StatsQueryClient};
use gateway_telemetry::models::*;

pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

/// Fixed "now" used by pipeline tests.
pub fn now() -> DateTime<Utc> {
    at(2026, 3, 31, 12, 0)
}

pub fn row(ts: DateTime<Utc>, rx: u64, rx_ok: u64, tx_rx: u64, tx_emitted: u64) -> StatRow {
    StatRow {
        timestamp: ts,
        rx_packets_received: rx,
        rx_packets_received_ok: rx_ok,
        tx_packets_received: tx_rx,
        tx_packets_emitted: tx_emitted,
    }
}

/// Day bucket with only the counters the throughput chart reads.
pub fn day_row(day: u32, rx_ok: u64, tx_emitted: u64) -> StatRow {
    row(at(2026, 3, day, 0, 0), 0, rx_ok, 0, tx_emitted)
}

pub fn device(id: &str) -> DeviceContext {
    DeviceContext {
        id: id.to_string(),
        location: Location {
            latitude: Some(52.37),
            longitude: Some(4.89),
            altitude: Some(3.0),
        },
        last_seen_at: Some(at(2026, 3, 31, 11, 59)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryCall {
    pub device_id: String,
    pub interval: Interval,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Answers per interval; intervals with nothing configured return zero rows.
pub struct StubClient {
    responses: Mutex<HashMap<Interval, Result<Vec<StatRow>, StatsError>>>,
    device: Mutex<Result<DeviceContext, StatsError>>,
    calls: Mutex<Vec<QueryCall>>,
    delays: Mutex<HashMap<Interval, Duration>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            device: Mutex::new(Err(StatsError::NotFound("stub".into()))),
            calls: Mutex::new(Vec::new()),
            delays: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_rows(interval: Interval, rows: Vec<StatRow>) -> Self {
        let c = Self::new();
        c.set_rows(interval, rows);
        c
    }

    pub fn set_rows(&self, interval: Interval, rows: Vec<StatRow>) {
        self.responses.lock().unwrap().insert(interval, Ok(rows));
    }

    pub fn set_error(&self, interval: Interval, err: StatsError) {
        self.responses.lock().unwrap().insert(interval, Err(err));
    }

    pub fn set_device(&self, result: Result<DeviceContext, StatsError>) {
        *self.device.lock().unwrap() = result;
    }

    /// Answers for `interval` are captured at call time and returned after `delay`.
    pub fn set_delay(&self, interval: Interval, delay: Duration) {
        self.delays.lock().unwrap().insert(interval, delay);
    }

    pub fn calls(&self) -> Vec<QueryCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl StatsQueryClient for StubClient {
    async fn query(
        &self,
        device_id: &str,
        interval: Interval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StatRow>, StatsError> {
        self.calls.lock().unwrap().push(QueryCall {
            device_id: device_id.to_string(),
            interval,
            start,
            end,
        });
        let answer = {
            let responses = self.responses.lock().unwrap();
            responses.get(&interval).cloned().unwrap_or(Ok(Vec::new()))
        };
        let delay = self.delays.lock().unwrap().get(&interval).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        answer
    }
}

impl DeviceMetadataClient for StubClient {
    async fn fetch_device(&self, _device_id: &str) -> Result<DeviceContext, StatsError> {
        self.device.lock().unwrap().clone()
    }
}
