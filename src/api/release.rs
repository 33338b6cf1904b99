use crate::api::MgmtState;
use crate::error::{AppError, Result};
use axum::{Json, extract::State, http::header::HeaderMap};
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub released: u64,
    pub timestamp: OffsetDateTime,
}

/// External trigger for the release sweep, intended for a cron scheduler.
/// Shares its implementation with the in-process worker, so any cadence or
/// overlap with a worker tick is safe.
///
/// # Errors
/// Returns `AppError::AuthError` if the configured release secret does not
/// match, `AppError::Database` if the sweep fails (nothing is released).
pub async fn trigger_release(State(state): State<MgmtState>, headers: HeaderMap) -> Result<Json<ReleaseResponse>> {
    if let Some(secret) = &state.release_secret {
        let presented = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(secret.as_str()) {
            return Err(AppError::AuthError);
        }
    }

    let now = OffsetDateTime::now_utc();
    let released = state.release_service.release_due(now).await?;

    Ok(Json(ReleaseResponse { released, timestamp: now }))
}
