use sqlx::PgPool;
use std::sync::Once;
use time::OffsetDateTime;
use uuid::Uuid;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("nido_server=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

/// Connects to the test database, or returns `None` when `DATABASE_URL` is
/// not configured so database-backed tests skip cleanly.
#[allow(dead_code)]
pub async fn try_test_pool() -> Option<PgPool> {
    setup_tracing();

    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return None;
    };

    let pool = nido_server::storage::init_pool(&database_url)
        .await
        .expect("Failed to connect to DB. Is Postgres running?");

    sqlx::migrate!().run(&pool).await.expect("Failed to run migrations");

    Some(pool)
}

/// Inserts a message row directly, bypassing the scheduler, for tests that
/// need precise control over the stored state.
#[allow(dead_code)]
pub async fn insert_message(
    pool: &PgPool,
    sender_id: Uuid,
    recipient_id: Uuid,
    content: &str,
    is_queued: bool,
    deliver_at: OffsetDateTime,
    created_at: OffsetDateTime,
) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO messages (sender_id, recipient_id, content, is_queued, deliver_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(sender_id)
    .bind(recipient_id)
    .bind(content)
    .bind(is_queued)
    .bind(deliver_at)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .unwrap()
}
