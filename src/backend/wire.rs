// JSON bodies of the REST stats backend.
// 64-bit counters may arrive as decimal strings (proto3 JSON), so both forms are accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::{StatsError, check_ordering};
use crate::models::{DeviceContext, Location, StatRow};

#[derive(Deserialize)]
struct StatsResponse {
    result: Vec<WireStatRow>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStatRow {
    timestamp: DateTime<Utc>,
    #[serde(deserialize_with = "counter")]
    rx_packets_received: u64,
    #[serde(rename = "rxPacketsReceivedOK", deserialize_with = "counter")]
    rx_packets_received_ok: u64,
    #[serde(deserialize_with = "counter")]
    tx_packets_received: u64,
    #[serde(deserialize_with = "counter")]
    tx_packets_emitted: u64,
}

impl From<WireStatRow> for StatRow {
    fn from(w: WireStatRow) -> Self {
        StatRow {
            timestamp: w.timestamp,
            rx_packets_received: w.rx_packets_received,
            rx_packets_received_ok: w.rx_packets_received_ok,
            tx_packets_received: w.tx_packets_received,
            tx_packets_emitted: w.tx_packets_emitted,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Counter {
    Number(u64),
    Text(String),
}

fn counter<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    match Counter::deserialize(d)? {
        Counter::Number(n) => Ok(n),
        Counter::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayResponse {
    gateway: WireGateway,
    #[serde(default)]
    last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct WireGateway {
    id: String,
    #[serde(default)]
    location: Location,
}

pub(super) fn decode_stats(body: &[u8]) -> Result<Vec<StatRow>, StatsError> {
    let resp: StatsResponse = serde_json::from_slice(body)
        .map_err(|e| StatsError::MalformedResponse(e.to_string()))?;
    let rows: Vec<StatRow> = resp.result.into_iter().map(StatRow::from).collect();
    check_ordering(&rows)?;
    Ok(rows)
}

pub(super) fn decode_device(body: &[u8]) -> Result<DeviceContext, StatsError> {
    let resp: GatewayResponse = serde_json::from_slice(body)
        .map_err(|e| StatsError::MalformedResponse(e.to_string()))?;
    Ok(DeviceContext {
        id: resp.gateway.id,
        location: resp.gateway.location,
        last_seen_at: resp.last_seen_at,
    })
}
