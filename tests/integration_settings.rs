mod common;

use nido_server::domain::quiet_hours::{QuietHours, WallTime};
use nido_server::storage::settings_repo::SettingsRepository;

fn wt(s: &str) -> WallTime {
    WallTime::parse(s).unwrap()
}

// The settings rows are org-global, so the whole lifecycle runs in one test.
#[tokio::test]
async fn test_quiet_hours_settings_lifecycle() {
    let Some(pool) = common::try_test_pool().await else { return };
    let repo = SettingsRepository::new(pool.clone());

    // Absent keys fall back to the documented defaults.
    sqlx::query("DELETE FROM org_settings WHERE key IN ('quiet_hours_start', 'quiet_hours_end')")
        .execute(&pool)
        .await
        .unwrap();

    let window = repo.fetch_quiet_hours().await.unwrap();
    assert_eq!(window, QuietHours::default());
    assert_eq!(window.start, wt("18:00"));
    assert_eq!(window.end, wt("07:00"));

    // An update is read back verbatim.
    repo.update_quiet_hours(QuietHours { start: wt("20:30"), end: wt("06:15") }).await.unwrap();
    let window = repo.fetch_quiet_hours().await.unwrap();
    assert_eq!(window.start, wt("20:30"));
    assert_eq!(window.end, wt("06:15"));

    // Updating again replaces, not duplicates.
    repo.update_quiet_hours(QuietHours { start: wt("19:00"), end: wt("08:00") }).await.unwrap();
    let count: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM org_settings WHERE key IN ('quiet_hours_start', 'quiet_hours_end')",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 2);

    // A corrupted stored value degrades to the default for that key only.
    sqlx::query("UPDATE org_settings SET value = 'bogus' WHERE key = 'quiet_hours_start'")
        .execute(&pool)
        .await
        .unwrap();
    let window = repo.fetch_quiet_hours().await.unwrap();
    assert_eq!(window.start, wt("18:00"));
    assert_eq!(window.end, wt("08:00"));

    // Restore defaults for other suites.
    repo.update_quiet_hours(QuietHours::default()).await.unwrap();
}
