use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

async fn status_handler() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub fn routes() -> Router {
    Router::new().route("/status", get(status_handler))
}
