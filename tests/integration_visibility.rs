mod common;

use nido_server::error::AppError;
use nido_server::services::message_service::MessageService;
use nido_server::storage::message_repo::MessageRepository;
use nido_server::storage::settings_repo::SettingsRepository;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime, UtcOffset};
use uuid::Uuid;

fn build_service(pool: &PgPool) -> MessageService {
    MessageService::new(
        MessageRepository::new(pool.clone()),
        SettingsRepository::new(pool.clone()),
        UtcOffset::UTC,
        50,
    )
}

#[tokio::test]
async fn test_conversation_excludes_undelivered_messages() {
    let Some(pool) = common::try_test_pool().await else { return };
    let service = build_service(&pool);

    let parent = Uuid::new_v4();
    let staff = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();

    let visible =
        common::insert_message(&pool, parent, staff, "delivered", false, now - Duration::hours(2), now - Duration::hours(2))
            .await;
    let reply =
        common::insert_message(&pool, staff, parent, "reply", false, now - Duration::hours(1), now - Duration::hours(1))
            .await;
    let held =
        common::insert_message(&pool, staff, parent, "held for morning", true, now + Duration::hours(8), now).await;

    let conversation = service.fetch_conversation(parent, staff).await.unwrap();
    let ids: Vec<Uuid> = conversation.iter().map(|m| m.id).collect();

    assert_eq!(ids, vec![visible, reply], "oldest first, future deliveries hidden");
    assert!(!ids.contains(&held));

    // Released-but-past-deliver_at rows appear; the held one shows up only
    // once its delivery time passes, regardless of who asks.
    let as_staff = service.fetch_conversation(staff, parent).await.unwrap();
    assert_eq!(as_staff.len(), 2);
}

#[tokio::test]
async fn test_mark_read_requires_recipient_and_visibility() {
    let Some(pool) = common::try_test_pool().await else { return };
    let service = build_service(&pool);

    let sender = Uuid::new_v4();
    let recipient = Uuid::new_v4();
    let now = OffsetDateTime::now_utc();

    let delivered =
        common::insert_message(&pool, sender, recipient, "seen?", false, now - Duration::minutes(5), now - Duration::minutes(5))
            .await;
    let future = common::insert_message(&pool, sender, recipient, "later", true, now + Duration::hours(4), now).await;

    // Only the recipient may acknowledge.
    let result = service.mark_read(sender, delivered).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    service.mark_read(recipient, delivered).await.unwrap();
    let is_read: bool = sqlx::query_scalar("SELECT is_read FROM messages WHERE id = $1")
        .bind(delivered)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(is_read);

    // Acknowledging twice is harmless.
    service.mark_read(recipient, delivered).await.unwrap();

    // A message still in the queue cannot be acknowledged.
    let result = service.mark_read(recipient, future).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}
