use crate::api::MgmtState;
use axum::{extract::State, http::StatusCode};

pub async fn livez() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn readyz(State(state): State<MgmtState>) -> StatusCode {
    match state.health_service.check_ready().await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            tracing::warn!(error = ?e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
