use crate::domain::message::{Message, Submission};
use crate::domain::quiet_hours::plan_delivery;
use crate::error::Result;
use crate::storage::message_repo::MessageRepository;
use crate::storage::settings_repo::SettingsRepository;
use opentelemetry::{
    KeyValue, global,
    metrics::Counter,
};
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    sent_total: Counter<u64>,
    queued_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("nido-server");
        Self {
            sent_total: meter
                .u64_counter("nido_messages_sent_total")
                .with_description("Total message submissions accepted")
                .build(),
            queued_total: meter
                .u64_counter("nido_messages_queued_total")
                .with_description("Total messages held for quiet hours")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MessageService {
    repo: MessageRepository,
    settings: SettingsRepository,
    org_offset: UtcOffset,
    conversation_batch_limit: i64,
    metrics: Metrics,
}

impl MessageService {
    #[must_use]
    pub fn new(
        repo: MessageRepository,
        settings: SettingsRepository,
        org_offset: UtcOffset,
        conversation_batch_limit: i64,
    ) -> Self {
        Self { repo, settings, org_offset, conversation_batch_limit, metrics: Metrics::new() }
    }

    /// Validates and schedules a message submission. During quiet hours the
    /// message is persisted with a future `deliver_at` and a set queued
    /// flag; otherwise it is visible immediately.
    ///
    /// The quiet-hours window is fetched fresh on every call, so an admin
    /// change applies to subsequent sends and never retroactively.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for empty content or a missing
    /// recipient, `AppError::Database` if persistence fails. No message is
    /// stored on failure.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, content, child_context_id),
        fields(queued = tracing::field::Empty)
    )]
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        recipient_id: Option<Uuid>,
        content: &str,
        child_context_id: Option<Uuid>,
    ) -> Result<Message> {
        let submission = Submission::validate(sender_id, recipient_id, content, child_context_id)?;

        let window = self.settings.fetch_quiet_hours().await?;
        let now = OffsetDateTime::now_utc();
        let plan = plan_delivery(now, self.org_offset, window);

        tracing::Span::current().record("queued", plan.queued);

        let message = match self.repo.create(&submission, plan.deliver_at, plan.queued, now).await {
            Ok(message) => message,
            Err(e) => {
                self.metrics.sent_total.add(1, &[KeyValue::new("status", "failure")]);
                return Err(e);
            }
        };

        self.metrics.sent_total.add(1, &[KeyValue::new("status", "success")]);
        if plan.queued {
            self.metrics.queued_total.add(1, &[]);
            tracing::debug!(deliver_at = %plan.deliver_at, "Message held for quiet hours");
        } else {
            tracing::debug!("Message delivered immediately");
        }

        Ok(message)
    }

    /// Fetches the visible conversation between the caller and a peer,
    /// oldest first. Queued messages with a future delivery time are
    /// filtered out here as well as by the reader-side contract.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn fetch_conversation(&self, user_id: Uuid, peer_id: Uuid) -> Result<Vec<Message>> {
        self.repo
            .fetch_conversation(user_id, peer_id, OffsetDateTime::now_utc(), self.conversation_batch_limit)
            .await
    }

    /// Records a read receipt on a delivered message.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` for an unknown, foreign, or not yet
    /// visible message.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn mark_read(&self, recipient_id: Uuid, message_id: Uuid) -> Result<()> {
        self.repo.mark_read(recipient_id, message_id, OffsetDateTime::now_utc()).await
    }
}
