// Shared test helpers: an in-process stand-in for the Grafana HTTP API.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hist_export::config::GrafanaConfig;
use serde_json::{Value, json};

pub const API_KEY: &str = "Bearer test-key";

#[derive(Clone, Default)]
pub struct MockState {
    /// datasource name -> id
    pub datasources: HashMap<String, i64>,
    /// datasource id -> full /api/ds/query response
    pub responses: HashMap<i64, Value>,
    pub query_bodies: Arc<Mutex<Vec<Value>>>,
    pub auth_headers: Arc<Mutex<Vec<String>>>,
}

pub struct MockGrafana {
    pub addr: SocketAddr,
    pub state: MockState,
}

impl MockGrafana {
    pub async fn start(state: MockState) -> Self {
        let app = Router::new()
            .route("/api/datasources/name/{name}", get(datasource))
            .route("/api/ds/query", post(query))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn config(&self) -> GrafanaConfig {
        GrafanaConfig {
            server: self.addr.ip().to_string(),
            port: self.addr.port(),
            api_key: API_KEY.into(),
            scheme: "http".into(),
            timeout_secs: 5,
        }
    }

    pub fn query_bodies(&self) -> Vec<Value> {
        self.state.query_bodies.lock().unwrap().clone()
    }

    pub fn auth_headers(&self) -> Vec<String> {
        self.state.auth_headers.lock().unwrap().clone()
    }
}

fn record_auth(state: &MockState, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.auth_headers.lock().unwrap().push(auth);
}

async fn datasource(
    State(state): State<MockState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    record_auth(&state, &headers);
    match state.datasources.get(&name) {
        Some(id) => Json(json!({ "id": id, "uid": format!("uid-{id}"), "name": name })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Data source not found" })),
        )
            .into_response(),
    }
}

async fn query(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_auth(&state, &headers);
    let id = body["queries"][0]["datasourceId"].as_i64().unwrap_or(-1);
    state.query_bodies.lock().unwrap().push(body);
    let resp = state
        .responses
        .get(&id)
        .cloned()
        .unwrap_or_else(|| json!({ "results": {} }));
    Json(resp).into_response()
}

/// One Prometheus-style frame: time column plus one labeled sample column.
pub fn frame(zone: &str, le: &str, host: &str, samples: &[Option<f64>]) -> Value {
    let times: Vec<i64> = (0..samples.len() as i64).map(|i| 1_700_000_000_000 + i * 60_000).collect();
    json!({
        "schema": {
            "fields": [
                { "name": "Time", "type": "time" },
                {
                    "name": "Value",
                    "type": "number",
                    "labels": {
                        "agent_tag_mzone_name": zone,
                        "le": le,
                        "host_hostname": host,
                    }
                }
            ]
        },
        "data": { "values": [times, samples] }
    })
}

pub fn query_response(frames: Vec<Value>) -> Value {
    json!({ "results": { "A": { "frames": frames } } })
}

/// What Prometheus sends when the selector matches nothing: a frame with no columns.
pub fn empty_match_frame() -> Value {
    json!({
        "schema": { "refId": "A", "meta": { "typeVersion": [0, 0] } },
        "data": { "values": [] }
    })
}
