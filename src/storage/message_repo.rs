use crate::domain::message::{Message, Submission};
use crate::error::{AppError, Result};
use crate::storage::models::MessageRecord;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a scheduled message. `created_at` and `deliver_at` come from
    /// the scheduling decision so the pair is consistent with the clock the
    /// decision was made against.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, submission))]
    pub async fn create(
        &self,
        submission: &Submission,
        deliver_at: OffsetDateTime,
        is_queued: bool,
        created_at: OffsetDateTime,
    ) -> Result<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (sender_id, recipient_id, child_context_id, content, is_queued, deliver_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, sender_id, recipient_id, child_context_id, content, is_queued, is_read, deliver_at, created_at
            "#,
        )
        .bind(submission.sender_id)
        .bind(submission.recipient_id)
        .bind(submission.child_context_id)
        .bind(&submission.content)
        .bind(is_queued)
        .bind(deliver_at)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    /// Clears the queued flag on every message whose delivery time has
    /// passed, in one conditional bulk update. Touches no other column.
    /// Safe to run concurrently: a row already cleared no longer matches
    /// the predicate.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails; no rows are
    /// released in that case.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn release_due(&self, now: OffsetDateTime) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_queued = FALSE
            WHERE is_queued = TRUE AND deliver_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Fetches the visible slice of the conversation between two users,
    /// oldest first. Messages whose `deliver_at` is still in the future are
    /// excluded regardless of their queued flag.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn fetch_conversation(
        &self,
        user_id: Uuid,
        peer_id: Uuid,
        now: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<Message>> {
        let mut records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, sender_id, recipient_id, child_context_id, content, is_queued, is_read, deliver_at, created_at
            FROM messages
            WHERE ((sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1))
              AND deliver_at <= $3
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(peer_id)
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        records.reverse();
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Marks a delivered message as read by its recipient.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the message does not exist, belongs
    /// to another recipient, or is not yet visible.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn mark_read(&self, recipient_id: Uuid, message_id: Uuid, now: OffsetDateTime) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE id = $1 AND recipient_id = $2 AND deliver_at <= $3
            "#,
        )
        .bind(message_id)
        .bind(recipient_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
