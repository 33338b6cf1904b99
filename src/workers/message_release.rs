use crate::services::release_service::ReleaseService;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::Instrument;

/// Periodically promotes queued messages whose delivery time has passed.
/// The interval is configurable (hourly by default); the sweep tolerates
/// any cadence, including an external trigger firing between ticks.
#[derive(Debug)]
pub struct MessageReleaseWorker {
    service: ReleaseService,
    interval_secs: u64,
}

impl MessageReleaseWorker {
    #[must_use]
    pub const fn new(service: ReleaseService, interval_secs: u64) -> Self {
        Self { service, interval_secs }
    }

    pub async fn run(self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self
                        .service
                        .release_due(OffsetDateTime::now_utc())
                        .instrument(tracing::info_span!("message_release_iteration"))
                        .await
                    {
                        tracing::error!(error = ?e, "Message release iteration failed");
                    }
                }
                _ = shutdown.changed() => {}
            }
        }
        tracing::info!("Message release loop shutting down...");
    }
}
