use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::histogram::SampleMode;
use crate::models::SeriesLabels;
use crate::report;

/// Format of `time_range.start` / `time_range.end`; read as UTC.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub grafana: GrafanaConfig,
    #[serde(default)]
    pub labels: SeriesLabels,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrafanaConfig {
    pub server: String,
    pub port: u16,
    /// Sent verbatim as the Authorization header (e.g. "Bearer glsa_...").
    pub api_key: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_scheme() -> String {
    "http".into()
}

fn default_timeout_secs() -> u64 {
    30
}

impl GrafanaConfig {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.server, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: ".".into(),
            file_prefix: "sdn_metrics".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricConfig {
    pub metric: String,
    /// Grafana datasource name.
    pub region: String,
    /// PromQL label matchers, e.g. `agent_tag_mzone_name="z1"`.
    #[serde(default)]
    pub labels: Vec<String>,
    pub time_range: TimeRange,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Sheet name; defaults to `<metric>_<position in config>`, cut from the front to fit
    /// Excel's 31-character limit.
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub mode: SampleMode,
}

fn default_enabled() -> bool {
    true
}

impl MetricConfig {
    /// `metric{label,label}`; no labels gives `metric{}`.
    pub fn expr(&self) -> String {
        format!("{}{{{}}}", self.metric, self.labels.join(","))
    }

    /// `index` is the 0-based position in `metrics`.
    pub fn sheet_name(&self, index: usize) -> String {
        self.sheet
            .clone()
            .unwrap_or_else(|| report::fit_sheet_name(&self.metric, &format!("_{}", index + 1)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    /// Start and end as unix milliseconds.
    pub fn to_millis(&self) -> anyhow::Result<(i64, i64)> {
        Ok((parse_millis(&self.start)?, parse_millis(&self.end)?))
    }
}

fn parse_millis(s: &str) -> anyhow::Result<i64> {
    let t = NaiveDateTime::parse_from_str(s.trim(), TIME_FORMAT)
        .map_err(|e| anyhow::anyhow!("invalid time '{}' (expected {}): {}", s, TIME_FORMAT, e))?;
    Ok(t.and_utc().timestamp_millis())
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "metrics.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
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
            !self.grafana.server.is_empty(),
            "grafana.server must be non-empty"
        );
        anyhow::ensure!(
            self.grafana.port > 0,
            "grafana.port must be between 1 and 65535, got {}",
            self.grafana.port
        );
        anyhow::ensure!(
            self.grafana.scheme == "http" || self.grafana.scheme == "https",
            "grafana.scheme must be http or https, got {}",
            self.grafana.scheme
        );
        anyhow::ensure!(
            self.grafana.timeout_secs > 0,
            "grafana.timeout_secs must be > 0, got {}",
            self.grafana.timeout_secs
        );
        anyhow::ensure!(
            !self.labels.group.is_empty()
                && !self.labels.bucket.is_empty()
                && !self.labels.host.is_empty(),
            "labels.group, labels.bucket and labels.host must be non-empty"
        );
        anyhow::ensure!(
            !self.output.file_prefix.is_empty(),
            "output.file_prefix must be non-empty"
        );
        for (i, m) in self.metrics.iter().enumerate() {
            anyhow::ensure!(!m.metric.is_empty(), "metrics[{}].metric must be non-empty", i);
            anyhow::ensure!(!m.region.is_empty(), "metrics[{}].region must be non-empty", i);
            let (start, end) = m
                .time_range
                .to_millis()
                .map_err(|e| anyhow::anyhow!("metrics[{}].time_range: {}", i, e))?;
            anyhow::ensure!(
                start <= end,
                "metrics[{}].time_range: start {} is after end {}",
                i,
                m.time_range.start,
                m.time_range.end
            );
            if let Some(sheet) = &m.sheet {
                if let Err(reason) = report::check_sheet_name(sheet) {
                    anyhow::bail!("metrics[{}].sheet: {}", i, reason);
                }
            }
        }
        Ok(())
    }
}
