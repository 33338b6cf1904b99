use crate::error::Result;
use crate::storage::message_repo::MessageRepository;
use opentelemetry::{global, metrics::Counter};
use time::OffsetDateTime;

#[derive(Clone, Debug)]
struct Metrics {
    released_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("nido-server");
        Self {
            released_total: meter
                .u64_counter("nido_messages_released_total")
                .with_description("Total queued messages released by the sweep")
                .build(),
        }
    }
}

/// Shared release-sweep entry point, used by both the in-process worker and
/// the external trigger endpoint.
#[derive(Clone, Debug)]
pub struct ReleaseService {
    repo: MessageRepository,
    metrics: Metrics,
}

impl ReleaseService {
    #[must_use]
    pub fn new(repo: MessageRepository) -> Self {
        Self { repo, metrics: Metrics::new() }
    }

    /// Releases every queued message whose delivery time has passed and
    /// returns how many were cleared. Idempotent: a second sweep over the
    /// same due set releases nothing further, and overlapping sweeps
    /// converge to the same state because the update predicate only matches
    /// rows still queued.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the bulk update fails; no messages
    /// are released in that case and the next tick retries.
    #[tracing::instrument(err, skip(self), fields(released = tracing::field::Empty))]
    pub async fn release_due(&self, now: OffsetDateTime) -> Result<u64> {
        let released = self.repo.release_due(now).await?;

        tracing::Span::current().record("released", released);
        if released > 0 {
            tracing::info!(count = %released, "Released queued messages");
            self.metrics.released_total.add(released, &[]);
        }

        Ok(released)
    }
}
