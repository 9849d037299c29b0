//! Integration tests for the SQLite-backed account store.
//!
//! Each test gets its own `sqlite::memory:` database on a single pooled
//! connection, so no external database is required.

use infludb_core::{Category, Platform, TrackedAccount};
use infludb_db::{AccountStore, DbError, PoolConfig, SqliteAccountStore};

async fn fresh_store() -> SqliteAccountStore {
    let pool = infludb_db::connect_pool("sqlite::memory:", PoolConfig::single_connection())
        .await
        .expect("failed to open in-memory sqlite");
    let applied = infludb_db::run_migrations(&pool)
        .await
        .expect("migrations failed");
    assert!(applied >= 1, "expected at least one migration to apply");
    SqliteAccountStore::new(pool)
}

fn account(name: &str, link: &str, platform: Platform) -> TrackedAccount {
    TrackedAccount::pending(name, link, platform)
}

#[tokio::test]
async fn ping_succeeds_on_fresh_pool() {
    let store = fresh_store().await;
    infludb_db::ping(store.pool()).await.unwrap();
}

#[tokio::test]
async fn upsert_twice_leaves_one_record_with_latest_values() {
    let store = fresh_store().await;
    let first = account("NASA", "https://instagram.com/nasa", Platform::Instagram);
    store.upsert(&first).await.unwrap();
    store
        .upsert(&first.with_outcome(98_000, Category::Micro))
        .await
        .unwrap();
    store
        .upsert(&first.with_outcome(97_500_000, Category::Macro))
        .await
        .unwrap();

    let all = store.list().await.unwrap();
    assert_eq!(all.len(), 1, "expected exactly one record, got: {all:?}");
    assert_eq!(all[0].followers, 97_500_000);
    assert_eq!(all[0].category, Category::Macro);
}

#[tokio::test]
async fn upsert_overwrites_name_and_platform() {
    let store = fresh_store().await;
    let link = "https://www.tiktok.com/@someone";
    let mut unsupported = account("Old Name", link, Platform::Unknown);
    unsupported.category = Category::FailedPlatform;
    store.upsert(&unsupported).await.unwrap();
    store
        .upsert(&account("New Name", link, Platform::TikTok))
        .await
        .unwrap();

    let stored = store.get(link).await.unwrap().expect("record exists");
    assert_eq!(stored.name, "New Name");
    assert_eq!(stored.platform, Platform::TikTok);
    assert_eq!(stored.category, Category::Pending);
}

#[tokio::test]
async fn get_returns_none_for_unknown_link() {
    let store = fresh_store().await;
    assert!(store.get("https://x.com/nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_removes_only_the_target() {
    let store = fresh_store().await;
    store
        .upsert(&account("A", "https://x.com/a", Platform::Twitter))
        .await
        .unwrap();
    store
        .upsert(&account("B", "https://x.com/b", Platform::Twitter))
        .await
        .unwrap();

    store.delete("https://x.com/a").await.unwrap();

    let links: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.link)
        .collect();
    assert_eq!(links, vec!["https://x.com/b".to_string()]);
}

#[tokio::test]
async fn delete_unknown_link_is_not_found() {
    let store = fresh_store().await;
    let result = store.delete("https://x.com/ghost").await;
    assert!(
        matches!(result, Err(DbError::NotFound)),
        "expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn list_orders_by_name() {
    let store = fresh_store().await;
    let zed = account("Zed", "https://x.com/zed", Platform::Twitter);
    store.upsert(&zed).await.unwrap();
    let amy = account("Amy", "https://instagram.com/amy", Platform::Instagram);
    store.upsert(&amy).await.unwrap();

    let names: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Amy".to_string(), "Zed".to_string()]);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let store = fresh_store().await;
    let applied_again = infludb_db::run_migrations(store.pool()).await.unwrap();
    assert_eq!(applied_again, 0);
}
