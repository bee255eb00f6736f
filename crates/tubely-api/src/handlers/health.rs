use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness plus a metadata store round trip.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match tokio::time::timeout(TIMEOUT, state.repository.ping()).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Metadata store health check failed");
            format!("unhealthy: {}", e)
        }
        Err(_) => "timeout".to_string(),
    };

    let healthy = database == "healthy";
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if healthy { "healthy" } else { "unhealthy" },
            "database": database,
        })),
    )
}
