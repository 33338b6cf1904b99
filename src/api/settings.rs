use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::domain::auth::Role;
use crate::domain::quiet_hours::QuietHours;
use crate::error::{AppError, Result};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct QuietHoursResponse {
    pub start: String,
    pub end: String,
}

impl From<QuietHours> for QuietHoursResponse {
    fn from(w: QuietHours) -> Self {
        Self { start: w.start.to_string(), end: w.end.to_string() }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuietHoursRequest {
    pub start: String,
    pub end: String,
}

/// Returns the organization's current quiet-hours window.
///
/// # Errors
/// Returns `AppError::Database` if the settings read fails.
pub async fn get_quiet_hours(_auth_user: AuthUser, State(state): State<AppState>) -> Result<Json<QuietHoursResponse>> {
    let window = state.settings_service.quiet_hours().await?;
    Ok(Json(window.into()))
}

/// Updates the quiet-hours window. Admin only; applies to subsequent sends,
/// never retroactively to already-queued messages.
///
/// # Errors
/// Returns `AppError::Forbidden` for non-admin callers and
/// `AppError::Validation` for values that are not `HH:MM`.
pub async fn update_quiet_hours(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateQuietHoursRequest>,
) -> Result<Json<QuietHoursResponse>> {
    if auth_user.role != Role::Admin {
        return Err(AppError::Forbidden);
    }

    let window = state.settings_service.update_quiet_hours(&req.start, &req.end).await?;
    Ok(Json(window.into()))
}
