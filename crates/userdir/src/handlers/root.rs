use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service identity and environment label.
pub async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "app": "userdir",
        "version": env!("CARGO_PKG_VERSION"),
        "env": state.config.env,
    }))
}

/// GET /ping - Basic liveness probe.
pub async fn ping() -> Json<&'static str> {
    Json("pong")
}
