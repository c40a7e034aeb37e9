use crate::api::ApiState;
use axum::{extract::State, http::StatusCode, Json};

use crate::health::SystemHealth;

/// `GET /ai/health` — aggregated health report for the monitoring widget.
pub async fn get_system_health(State(state): State<ApiState>) -> Json<SystemHealth> {
    Json(state.aggregator.system_health())
}

/// `POST /ai/reset` — force every breaker closed and clear every window.
pub async fn reset_system(State(state): State<ApiState>) -> StatusCode {
    state.aggregator.reset();
    tracing::info!("Manual system reset via API");
    StatusCode::NO_CONTENT
}
