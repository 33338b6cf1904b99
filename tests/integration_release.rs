mod common;

use nido_server::services::release_service::ReleaseService;
use nido_server::storage::message_repo::MessageRepository;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

#[tokio::test]
async fn test_due_message_is_released() {
    let Some(pool) = common::try_test_pool().await else { return };
    let service = ReleaseService::new(MessageRepository::new(pool.clone()));

    let sender = Uuid::new_v4();
    let recipient = Uuid::new_v4();
    let created = OffsetDateTime::now_utc() - Duration::hours(10);
    let due = created + Duration::hours(1);
    let id = common::insert_message(&pool, sender, recipient, "held overnight", true, due, created).await;

    let released = service.release_due(OffsetDateTime::now_utc()).await.unwrap();
    assert!(released >= 1);

    let (is_queued, deliver_at): (bool, OffsetDateTime) =
        sqlx::query_as("SELECT is_queued, deliver_at FROM messages WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(!is_queued);
    assert_eq!(deliver_at, due, "release must not alter deliver_at");

    // A later sweep never flips the flag back.
    service.release_due(OffsetDateTime::now_utc()).await.unwrap();

    let (still_cleared, deliver_at_after): (bool, OffsetDateTime) =
        sqlx::query_as("SELECT is_queued, deliver_at FROM messages WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(!still_cleared, "the queued flag never flips back");
    assert_eq!(deliver_at_after, due);
}

#[tokio::test]
async fn test_future_message_stays_queued() {
    let Some(pool) = common::try_test_pool().await else { return };
    let service = ReleaseService::new(MessageRepository::new(pool.clone()));

    let now = OffsetDateTime::now_utc();
    let id =
        common::insert_message(&pool, Uuid::new_v4(), Uuid::new_v4(), "tonight", true, now + Duration::hours(8), now)
            .await;

    service.release_due(OffsetDateTime::now_utc()).await.unwrap();

    let is_queued: bool = sqlx::query_scalar("SELECT is_queued FROM messages WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(is_queued, "a message with a future deliver_at must not be released");
}

#[tokio::test]
async fn test_release_touches_only_the_queued_flag() {
    let Some(pool) = common::try_test_pool().await else { return };
    let service = ReleaseService::new(MessageRepository::new(pool.clone()));

    let created = OffsetDateTime::now_utc() - Duration::days(1);
    let due = created + Duration::hours(9);
    let id = common::insert_message(&pool, Uuid::new_v4(), Uuid::new_v4(), "goodnight", true, due, created).await;

    service.release_due(OffsetDateTime::now_utc()).await.unwrap();

    let (content, is_read, deliver_at, created_at): (String, bool, OffsetDateTime, OffsetDateTime) =
        sqlx::query_as("SELECT content, is_read, deliver_at, created_at FROM messages WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();

    assert_eq!(content, "goodnight");
    assert!(!is_read);
    assert_eq!(deliver_at, due);
    assert_eq!(created_at, created);
}

#[tokio::test]
async fn test_concurrent_sweeps_converge() {
    let Some(pool) = common::try_test_pool().await else { return };
    let service = ReleaseService::new(MessageRepository::new(pool.clone()));

    let created = OffsetDateTime::now_utc() - Duration::hours(2);
    let id = common::insert_message(
        &pool,
        Uuid::new_v4(),
        Uuid::new_v4(),
        "raced",
        true,
        created + Duration::minutes(30),
        created,
    )
    .await;

    let now = OffsetDateTime::now_utc();
    let (a, b) = tokio::join!(service.release_due(now), service.release_due(now));
    a.unwrap();
    b.unwrap();

    let is_queued: bool = sqlx::query_scalar("SELECT is_queued FROM messages WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!is_queued, "overlapping sweeps must end in the released state");
}
