use crate::domain::quiet_hours::{QuietHours, WallTime};
use crate::error::Result;
use crate::storage::settings_repo::SettingsRepository;

#[derive(Clone, Debug)]
pub struct SettingsService {
    repo: SettingsRepository,
}

impl SettingsService {
    #[must_use]
    pub const fn new(repo: SettingsRepository) -> Self {
        Self { repo }
    }

    /// # Errors
    /// Returns `AppError::Database` if the settings read fails.
    pub async fn quiet_hours(&self) -> Result<QuietHours> {
        self.repo.fetch_quiet_hours().await
    }

    /// Validates and stores a new quiet-hours window. Takes effect for the
    /// next send; messages already queued keep their computed delivery time.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if either value is not `HH:MM`,
    /// `AppError::Database` if the write fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn update_quiet_hours(&self, start: &str, end: &str) -> Result<QuietHours> {
        let window = QuietHours { start: WallTime::parse(start)?, end: WallTime::parse(end)? };
        self.repo.update_quiet_hours(window).await?;
        tracing::info!(start = %window.start, end = %window.end, "Quiet hours updated");
        Ok(window)
    }
}
