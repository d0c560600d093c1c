// Grafana HTTP API client: datasource lookup by name, PromQL range query.
// Connection settings come in through GrafanaConfig at construction.

mod wire;

pub use wire::{DataSource, QueryRequest, QueryResponse};

use std::time::Duration;

use reqwest::Url;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::instrument;

use crate::config::GrafanaConfig;
use crate::models::RawSeries;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid grafana url: {0}")]
    InvalidUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("decoding response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
    #[error("datasource reported an error: {0}")]
    Backend(String),
    #[error("frame {index} has no sample column")]
    MalformedFrame { index: usize },
}

#[derive(Debug, Clone)]
pub struct GrafanaClient {
    base_url: Url,
    api_key: String,
    client: reqwest::Client,
}

impl GrafanaClient {
    pub fn new(config: &GrafanaConfig) -> Result<Self, QueryError> {
        let base = config.base_url();
        let base_url = Url::parse(&base).map_err(|e| QueryError::InvalidUrl(format!("{base}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(crate::version::user_agent())
            .build()?;
        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, QueryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| QueryError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Looks up a datasource by its name (the configured region).
    #[instrument(skip(self), fields(client = "grafana", operation = "datasource"))]
    pub async fn datasource(&self, region: &str) -> Result<DataSource, QueryError> {
        let url = self.endpoint(&["api", "datasources", "name", region])?;
        let req = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, self.api_key.as_str())
            .header(CONTENT_TYPE, "application/json");
        send_json(req, &url).await
    }

    /// Runs `expr` against the datasource over [from_ms, to_ms] and returns one raw series
    /// per frame.
    #[instrument(skip(self), fields(client = "grafana", operation = "query"))]
    pub async fn query(
        &self,
        datasource_id: i64,
        expr: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<RawSeries>, QueryError> {
        let url = self.endpoint(&["api", "ds", "query"])?;
        let req = self
            .client
            .post(url.clone())
            .header(AUTHORIZATION, self.api_key.as_str())
            .json(&QueryRequest::new(datasource_id, expr, from_ms, to_ms));
        let resp: QueryResponse = send_json(req, &url).await?;
        resp.into_series()
    }
}

async fn send_json<T: serde::de::DeserializeOwned>(
    req: reqwest::RequestBuilder,
    url: &Url,
) -> Result<T, QueryError> {
    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(QueryError::Status {
            url: url.to_string(),
            status,
            body,
        });
    }
    serde_json::from_str(&body).map_err(|source| QueryError::Decode {
        url: url.to_string(),
        source,
    })
}
