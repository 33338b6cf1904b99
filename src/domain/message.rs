use crate::error::{AppError, Result};
use time::OffsetDateTime;
use uuid::Uuid;

/// A stored parent/staff message. `deliver_at` controls visibility: readers
/// only see rows whose `deliver_at` has passed, and `is_queued` marks rows
/// the release sweep still has to clear. The two are redundant guards by
/// design.
#[derive(Debug, Clone)]
pub struct Message {
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

impl Message {
    #[must_use]
    pub fn is_visible_at(&self, now: OffsetDateTime) -> bool {
        self.deliver_at <= now
    }
}

/// A validated message submission, ready for scheduling.
#[derive(Debug, Clone)]
pub struct Submission {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub child_context_id: Option<Uuid>,
    pub content: String,
}

impl Submission {
    /// Validates a raw submission.
    ///
    /// # Errors
    /// Returns `AppError::Validation` when the recipient is missing or the
    /// content is empty after trimming. Nothing is persisted on failure.
    pub fn validate(
        sender_id: Uuid,
        recipient_id: Option<Uuid>,
        content: &str,
        child_context_id: Option<Uuid>,
    ) -> Result<Self> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("content required".to_string()));
        }
        let recipient_id = recipient_id.ok_or_else(|| AppError::Validation("recipient required".to_string()))?;

        Ok(Self { sender_id, recipient_id, child_context_id, content: content.to_string() })
    }
}
