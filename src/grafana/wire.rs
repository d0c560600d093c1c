// JSON shapes of the Grafana datasource lookup and /api/ds/query endpoints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::RawSeries;

use super::QueryError;

/// Ref id of the single query we send.
pub const REF_ID: &str = "A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: i64,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub queries: Vec<QueryTarget>,
    /// Unix milliseconds, as a string.
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryTarget {
    pub ref_id: String,
    pub expr: String,
    pub datasource_id: i64,
}

impl QueryRequest {
    pub fn new(datasource_id: i64, expr: &str, from_ms: i64, to_ms: i64) -> Self {
        Self {
            queries: vec![QueryTarget {
                ref_id: REF_ID.to_string(),
                expr: expr.to_string(),
                datasource_id,
            }],
            from: from_ms.to_string(),
            to: to_ms.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: HashMap<String, QueryResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub schema: Schema,
    #[serde(default)]
    pub data: FrameData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameData {
    /// Column-major: values[0] is time, values[1] the samples. Gaps come back as null.
    #[serde(default)]
    pub values: Vec<Vec<Option<f64>>>,
}

impl QueryResponse {
    /// Flattens the frames of our query into raw series. No result for our ref id, or
    /// frames without value columns (what Prometheus sends for an empty match), mean no
    /// data; a backend error string is surfaced as an error.
    pub fn into_series(mut self) -> Result<Vec<RawSeries>, QueryError> {
        let Some(result) = self.results.remove(REF_ID) else {
            return Ok(Vec::new());
        };
        if let Some(err) = result.error {
            return Err(QueryError::Backend(err));
        }
        result
            .frames
            .into_iter()
            .enumerate()
            .filter_map(|(index, frame)| frame.into_series(index).transpose())
            .collect()
    }
}

impl Frame {
    /// None for an empty frame; an error when values are present but the label or
    /// sample column is missing.
    fn into_series(mut self, index: usize) -> Result<Option<RawSeries>, QueryError> {
        if self.data.values.is_empty() {
            return Ok(None);
        }
        if self.schema.fields.len() < 2 || self.data.values.len() < 2 {
            return Err(QueryError::MalformedFrame { index });
        }
        let labels = self.schema.fields.swap_remove(1).labels.unwrap_or_default();
        let samples = self.data.values.swap_remove(1).into_iter().flatten().collect();
        Ok(Some(RawSeries { labels, samples }))
    }
}
