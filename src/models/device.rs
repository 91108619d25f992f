// Device metadata passed through to the renderer untouched

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::series::LabelTimezone;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Meters.
    pub altitude: Option<f64>,
}

impl Location {
    /// Map center as (latitude, longitude); (0, 0) when either coordinate is missing.
    pub fn map_center(&self) -> (f64, f64) {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceContext {
    pub id: String,
    #[serde(default)]
    pub location: Location,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl DeviceContext {
    /// "Never" when the gateway has not been seen, else e.g. "Sep 4, 2026 8:30 PM".
    pub fn last_seen_display(&self, tz: LabelTimezone) -> String {
        match &self.last_seen_at {
            Some(ts) => tz.format(ts, "%b %-d, %Y %-I:%M %p"),
            None => "Never".to_string(),
        }
    }
}
