use crate::error::Result;
use crate::storage::DbPool;

#[derive(Clone, Debug)]
pub struct HealthService {
    pool: DbPool,
}

impl HealthService {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Readiness probe: verifies the database answers.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the round trip fails.
    pub async fn check_ready(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
