use std::collections::HashSet;
use std::str::FromStr;

use serde::Deserialize;

use crate::pipeline::PipelineSettings;
use crate::series::LabelTimezone;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub gateways: GatewaysConfig,
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Root of the REST API, e.g. "http://localhost:8080".
    pub base_url: String,
    /// Bearer token; requests are sent unauthenticated when absent.
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewaysConfig {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    pub interval_secs: u64,
    /// Optional cron expression (local time, e.g. "0 */5 * * * *"). Overrides interval_secs.
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default = "default_throughput_window_days")]
    pub throughput_window_days: u32,
    #[serde(default = "default_liveness_window_hours")]
    pub liveness_window_hours: u32,
    #[serde(default)]
    pub label_timezone: LabelTimezone,
    /// How often to log app stats (cycles, failures, WS clients) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

/// Ten years of day buckets.
pub const MAX_THROUGHPUT_WINDOW_DAYS: u32 = 3660;
/// One month of minute buckets.
pub const MAX_LIVENESS_WINDOW_HOURS: u32 = 744;

fn default_throughput_window_days() -> u32 {
    30
}

fn default_liveness_window_hours() -> u32 {
    2
}

fn default_stats_log_interval_secs() -> u64 {
    300
}

impl RefreshConfig {
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            throughput_window: chrono::TimeDelta::days(i64::from(self.throughput_window_days)),
            liveness_window: chrono::TimeDelta::hours(i64::from(self.liveness_window_hours)),
            label_timezone: self.label_timezone,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        let base_url = self.backend.base_url.trim();
        anyhow::ensure!(
            base_url.starts_with("http://") || base_url.starts_with("https://"),
            "backend.base_url must start with http:// or https://, got {:?}",
            self.backend.base_url
        );
        anyhow::ensure!(
            self.backend.request_timeout_secs > 0,
            "backend.request_timeout_secs must be > 0, got {}",
            self.backend.request_timeout_secs
        );
        anyhow::ensure!(
            !self.gateways.ids.is_empty(),
            "gateways.ids must list at least one gateway"
        );
        let mut seen = HashSet::new();
        for id in &self.gateways.ids {
            anyhow::ensure!(
                !id.trim().is_empty(),
                "gateways.ids must not contain blank ids"
            );
            anyhow::ensure!(seen.insert(id.as_str()), "gateways.ids has duplicate {:?}", id);
        }
        anyhow::ensure!(
            self.refresh.interval_secs > 0,
            "refresh.interval_secs must be > 0, got {}",
            self.refresh.interval_secs
        );
        if let Some(schedule) = &self.refresh.schedule {
            cron::Schedule::from_str(schedule).map_err(|e| {
                anyhow::anyhow!("refresh.schedule is not a valid cron expression: {}", e)
            })?;
        }
        anyhow::ensure!(
            (1..=MAX_THROUGHPUT_WINDOW_DAYS).contains(&self.refresh.throughput_window_days),
            "refresh.throughput_window_days must be in 1..={}, got {}",
            MAX_THROUGHPUT_WINDOW_DAYS,
            self.refresh.throughput_window_days
        );
        anyhow::ensure!(
            (1..=MAX_LIVENESS_WINDOW_HOURS).contains(&self.refresh.liveness_window_hours),
            "refresh.liveness_window_hours must be in 1..={}, got {}",
            MAX_LIVENESS_WINDOW_HOURS,
            self.refresh.liveness_window_hours
        );
        anyhow::ensure!(
            self.refresh.stats_log_interval_secs > 0,
            "refresh.stats_log_interval_secs must be > 0, got {}",
            self.refresh.stats_log_interval_secs
        );
        Ok(())
    }
}
