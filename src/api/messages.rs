use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::domain::message::Message;
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub recipient_id: Option<Uuid>,
    pub content: String,
    pub child_context_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub id: Uuid,
    pub queued: bool,
    pub deliver_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub child_context_id: Option<Uuid>,
    pub content: String,
    pub is_read: bool,
    pub deliver_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            recipient_id: m.recipient_id,
            child_context_id: m.child_context_id,
            content: m.content,
            is_read: m.is_read,
            deliver_at: m.deliver_at,
            created_at: m.created_at,
        }
    }
}

/// Submits a message. The response tells the sender whether it was held for
/// quiet hours and when it becomes visible.
///
/// # Errors
/// Returns `AppError::Validation` for empty content or a missing recipient.
pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    let message = state
        .message_service
        .send_message(auth_user.user_id, req.recipient_id, &req.content, req.child_context_id)
        .await?;

    let response = SendMessageResponse { id: message.id, queued: message.is_queued, deliver_at: message.deliver_at };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Fetches the visible conversation with a peer, oldest first.
///
/// # Errors
/// Returns `AppError::Database` if the query fails.
pub async fn get_conversation(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(peer_id): Path<Uuid>,
) -> Result<Json<Vec<MessageResponse>>> {
    let messages = state.message_service.fetch_conversation(auth_user.user_id, peer_id).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// Marks a delivered message as read by the caller.
///
/// # Errors
/// Returns `AppError::NotFound` if the message is unknown, someone else's,
/// or not yet visible.
pub async fn mark_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.message_service.mark_read(auth_user.user_id, message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
