// Stats backend: query contract, error taxonomy, and the REST client.
// Clients do no caching and no retries; the refresh worker decides when to ask again.

mod http;
mod wire;

use std::future::Future;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::models::{DeviceContext, Interval, StatRow};

pub use http::HttpStatsClient;

#[derive(Debug, Clone, Error)]
pub enum StatsError {
    /// Caller asked for a window that ends before it starts.
    #[error("invalid query range: start {start} is after end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Window start would fall before the earliest representable instant.
    #[error("query window {window} ending at {end} is out of range")]
    WindowOutOfRange { window: TimeDelta, end: DateTime<Utc> },

    /// Transport failure or non-success status from the backend.
    #[error("stats query failed: {0}")]
    Query(String),

    #[error("device not found: {0}")]
    NotFound(String),

    /// Body did not decode, a field was missing, or rows were out of order.
    #[error("malformed stats response: {0}")]
    MalformedResponse(String),
}

/// One time-bucketed stats query over `[start, end)`.
///
/// Rows come back ascending by timestamp. Buckets without data may be present
/// with zero counters rather than omitted.
pub trait StatsQueryClient: Send + Sync {
    fn query(
        &self,
        device_id: &str,
        interval: Interval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<StatRow>, StatsError>> + Send;
}

/// Static device metadata (id, location, last seen).
pub trait DeviceMetadataClient: Send + Sync {
    fn fetch_device(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<DeviceContext, StatsError>> + Send;
}

pub fn check_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), StatsError> {
    if start > end {
        return Err(StatsError::InvalidRange { start, end });
    }
    Ok(())
}

/// Rejects rows whose timestamps go backwards. Equal timestamps are allowed.
pub fn check_ordering(rows: &[StatRow]) -> Result<(), StatsError> {
    if let Some(pair) = rows.windows(2).find(|w| w[1].timestamp < w[0].timestamp) {
        return Err(StatsError::MalformedResponse(format!(
            "timestamps not ascending: {} followed by {}",
            pair[0].timestamp, pair[1].timestamp
        )));
    }
    Ok(())
}
