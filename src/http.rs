use crate::ingest::IngestCounters;
use crate::snapshot::Snapshot;
use crate::state::BridgeState;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

const DASHBOARD_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Machine Monitor</title>
    <style>
      body { font-family: system-ui; padding: 24px; }
      .off { color: #6b7280; }
      .running { color: #15803d; }
      .malfunctioning { color: #b91c1c; }
      dt { font-weight: 600; }
    </style>
  </head>
  <body>
    <h1>Machine Monitor</h1>
    <dl>
      <dt>Status</dt><dd id="status">-</dd>
      <dt>Amperage</dt><dd id="amperage">-</dd>
      <dt>Vibration</dt><dd id="vibration">-</dd>
      <dt>Updated</dt><dd id="timestamp">-</dd>
    </dl>
    <script>
      async function refresh() {
        try {
          const res = await fetch("/data", { cache: "no-store" });
          const data = await res.json();
          const status = document.getElementById("status");
          status.textContent = data.status;
          status.className = data.status;
          document.getElementById("amperage").textContent = data.amperage.toFixed(2) + " A";
          document.getElementById("vibration").textContent = data.vibration ? "yes" : "no";
          document.getElementById("timestamp").textContent = data.timestamp;
        } catch (err) {
          document.getElementById("status").textContent = "unreachable";
        }
      }
      refresh();
      setInterval(refresh, 1000);
    </script>
  </body>
</html>
"#;

#[derive(Debug, Serialize)]
struct StatusResponse {
    #[serde(flatten)]
    counters: IngestCounters,
    last_update: Option<String>,
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_data(State(state): State<BridgeState>) -> Json<Snapshot> {
    let snapshot = Snapshot::capture(&state);
    tracing::trace!(status = snapshot.status.as_str(), "served snapshot");
    Json(snapshot)
}

async fn get_status(State(state): State<BridgeState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        counters: state.stats.counters(),
        last_update: state.store.updated_at().map(|ts| ts.to_rfc3339()),
    })
}

pub fn router(state: BridgeState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/data", get(get_data))
        .route("/healthz", get(healthz))
        .route("/v1/status", get(get_status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
