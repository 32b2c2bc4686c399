use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::AppState;
use crate::credentials;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Liveness plus a credentials check that never touches the network.
/// `degraded` means the service is up but OCR calls will fail.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (configured, message) = match credentials::load(&state.config.credentials_path) {
        Ok(_) => (true, "OK".to_string()),
        Err(e) => (false, e.to_string()),
    };

    Json(json!({
        "status": if configured { "healthy" } else { "degraded" },
        "google_configured": configured,
        "credentials_file": state.config.credentials_path.clone(),
        "credentials_message": message,
        "project_id": state.config.project_id.clone(),
    }))
}
