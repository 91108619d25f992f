// Stat rows as reported by the backend, one per time bucket

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bucket width for a stats query; serializes to the backend's uppercase names (e.g. "DAY").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Interval {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute => "MINUTE",
            Interval::Hour => "HOUR",
            Interval::Day => "DAY",
            Interval::Week => "WEEK",
            Interval::Month => "MONTH",
            Interval::Quarter => "QUARTER",
            Interval::Year => "YEAR",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One backend bucket. `timestamp` is the bucket start.
///
/// A bucket the gateway never reported for and a bucket it reported with no
/// traffic both arrive as all-zero counters; nothing here tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatRow {
    pub timestamp: DateTime<Utc>,
    pub rx_packets_received: u64,
    #[serde(rename = "rxPacketsReceivedOK")]
    pub rx_packets_received_ok: u64,
    pub tx_packets_received: u64,
    pub tx_packets_emitted: u64,
}

impl StatRow {
    /// Sum of all four counters (saturating).
    pub fn activity(&self) -> u64 {
        self.rx_packets_received
            .saturating_add(self.rx_packets_received_ok)
            .saturating_add(self.tx_packets_received)
            .saturating_add(self.tx_packets_emitted)
    }
}
