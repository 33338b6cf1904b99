use crate::domain::quiet_hours::{QuietHours, WallTime};
use crate::error::Result;
use crate::storage::models::SettingRecord;
use sqlx::PgPool;

const QUIET_HOURS_START_KEY: &str = "quiet_hours_start";
const QUIET_HOURS_END_KEY: &str = "quiet_hours_end";

#[derive(Clone, Debug)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reads the organization's quiet-hours window. A missing key falls
    /// back to its default (`18:00` / `07:00`); an unparseable stored value
    /// does too, with a warning, so one bad row cannot block sends.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn fetch_quiet_hours(&self) -> Result<QuietHours> {
        let records = sqlx::query_as::<_, SettingRecord>(
            "SELECT key, value FROM org_settings WHERE key = ANY($1)",
        )
        .bind(vec![QUIET_HOURS_START_KEY, QUIET_HOURS_END_KEY])
        .fetch_all(&self.pool)
        .await?;

        let mut window = QuietHours::default();
        for record in records {
            let parsed = match WallTime::parse(&record.value) {
                Ok(t) => t,
                Err(_) => {
                    tracing::warn!(key = %record.key, value = %record.value, "Unparseable quiet-hours setting, using default");
                    continue;
                }
            };
            match record.key.as_str() {
                QUIET_HOURS_START_KEY => window.start = parsed,
                QUIET_HOURS_END_KEY => window.end = parsed,
                _ => {}
            }
        }

        Ok(window)
    }

    /// Stores a new quiet-hours window, replacing any previous values.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the upsert fails.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn update_quiet_hours(&self, window: QuietHours) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO org_settings (key, value, updated_at)
            VALUES ($1, $2, NOW()), ($3, $4, NOW())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(QUIET_HOURS_START_KEY)
        .bind(window.start.to_string())
        .bind(QUIET_HOURS_END_KEY)
        .bind(window.end.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
