use crate::domain::message::Message;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct MessageRecord {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub child_context_id: Option<Uuid>,
    pub content: String,
    pub is_queued: bool,
    pub is_read: bool,
    pub deliver_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl From<MessageRecord> for Message {
    fn from(r: MessageRecord) -> Self {
        Self {
            id: r.id,
            sender_id: r.sender_id,
            recipient_id: r.recipient_id,
            child_context_id: r.child_context_id,
            content: r.content,
            is_queued: r.is_queued,
            is_read: r.is_read,
            deliver_at: r.deliver_at,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SettingRecord {
    pub key: String,
    pub value: String,
}
