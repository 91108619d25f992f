// REST client for the gateway stats backend (reqwest).

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::{debug, instrument};

use super::{DeviceMetadataClient, StatsError, StatsQueryClient, check_range, wire};
use crate::config::BackendConfig;
use crate::models::{DeviceContext, Interval, StatRow};

/// Header carrying the bearer token through the backend's gRPC gateway.
const AUTH_HEADER: &str = "Grpc-Metadata-Authorization";

pub struct HttpStatsClient {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpStatsClient {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(config.base_url.trim())?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "backend.base_url cannot be used as a base URL: {}",
            base_url
        );
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` with `segments` appended as path segments (each percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StatsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StatsError::Query(format!("bad base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(
        &self,
        url: Url,
        query: &[(&str, &str)],
        device_id: &str,
    ) -> Result<Bytes, StatsError> {
        let mut req = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query);
        if let Some(token) = &self.api_token {
            req = req.header(AUTH_HEADER, format!("Bearer {}", token));
        }
        let res = req
            .send()
            .await
            .map_err(|e| StatsError::Query(e.to_string()))?;
        match res.status() {
            StatusCode::NOT_FOUND => Err(StatsError::NotFound(device_id.to_string())),
            status if !status.is_success() => {
                Err(StatsError::Query(format!("backend returned {}", status)))
            }
            _ => res
                .bytes()
                .await
                .map_err(|e| StatsError::Query(e.to_string())),
        }
    }
}

fn timestamp_param(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl StatsQueryClient for HttpStatsClient {
    #[instrument(skip(self), fields(operation = "query_stats"))]
    async fn query(
        &self,
        device_id: &str,
        interval: Interval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StatRow>, StatsError> {
        check_range(start, end)?;
        let url = self.endpoint(&["api", "gateways", device_id, "stats"])?;
        let start = timestamp_param(&start);
        let end = timestamp_param(&end);
        let body = self
            .get(
                url,
                &[
                    ("interval", interval.as_str()),
                    ("startTimestamp", start.as_str()),
                    ("endTimestamp", end.as_str()),
                ],
                device_id,
            )
            .await?;
        let rows = wire::decode_stats(&body)?;
        debug!(rows = rows.len(), "stats query complete");
        Ok(rows)
    }
}

impl DeviceMetadataClient for HttpStatsClient {
    #[instrument(skip(self), fields(operation = "fetch_device"))]
    async fn fetch_device(&self, device_id: &str) -> Result<DeviceContext, StatsError> {
        let url = self.endpoint(&["api", "gateways", device_id])?;
        let body = self.get(url, &[], device_id).await?;
        wire::decode_device(&body)
    }
}
