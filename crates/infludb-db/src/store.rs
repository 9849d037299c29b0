//! The narrow persistence contract the tracker depends on.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use infludb_core::TrackedAccount;
use sqlx::SqlitePool;

use crate::{AccountRow, DbError};

/// Keyed store of tracked accounts. `link` is the unique key.
///
/// Writes are idempotent and last-write-wins per key; no cross-key
/// transaction is offered or required.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn upsert(&self, account: &TrackedAccount) -> Result<(), DbError>;
    async fn delete(&self, link: &str) -> Result<(), DbError>;
    async fn list(&self) -> Result<Vec<TrackedAccount>, DbError>;
    async fn get(&self, link: &str) -> Result<Option<TrackedAccount>, DbError>;
}

/// [`AccountStore`] backed by the SQLite `accounts` table.
#[derive(Debug, Clone)]
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn upsert(&self, account: &TrackedAccount) -> Result<(), DbError> {
        crate::accounts::upsert_account(&self.pool, account).await
    }

    async fn delete(&self, link: &str) -> Result<(), DbError> {
        crate::accounts::delete_account(&self.pool, link).await
    }

    async fn list(&self) -> Result<Vec<TrackedAccount>, DbError> {
        let rows = crate::accounts::list_accounts(&self.pool).await?;
        Ok(rows.into_iter().map(AccountRow::into_tracked).collect())
    }

    async fn get(&self, link: &str) -> Result<Option<TrackedAccount>, DbError> {
        let row = crate::accounts::get_account(&self.pool, link).await?;
        Ok(row.map(AccountRow::into_tracked))
    }
}

/// In-process [`AccountStore`]. Nothing is persisted across restarts.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<String, TrackedAccount>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, TrackedAccount>> {
        // A poisoned map is still structurally valid; keep serving it.
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn upsert(&self, account: &TrackedAccount) -> Result<(), DbError> {
        self.lock().insert(account.link.clone(), account.clone());
        Ok(())
    }

    async fn delete(&self, link: &str) -> Result<(), DbError> {
        if self.lock().remove(link).is_none() {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<TrackedAccount>, DbError> {
        let mut accounts: Vec<TrackedAccount> = self.lock().values().cloned().collect();
        accounts.sort_by(|a, b| (&a.name, &a.link).cmp(&(&b.name, &b.link)));
        Ok(accounts)
    }

    async fn get(&self, link: &str) -> Result<Option<TrackedAccount>, DbError> {
        Ok(self.lock().get(link).cloned())
    }
}

#[cfg(test)]
mod tests {
    use infludb_core::{Category, Platform};

    use super::*;

    fn account(link: &str, followers: u64, category: Category) -> TrackedAccount {
        TrackedAccount {
            name: "Test".to_string(),
            link: link.to_string(),
            platform: Platform::Twitter,
            followers,
            category,
        }
    }

    #[tokio::test]
    async fn memory_upsert_is_last_write_wins() {
        let store = MemoryAccountStore::new();
        store
            .upsert(&account("https://x.com/a", 10, Category::Micro))
            .await
            .unwrap();
        store
            .upsert(&account("https://x.com/a", 250_000, Category::Macro))
            .await
            .unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].followers, 250_000);
        assert_eq!(all[0].category, Category::Macro);
    }

    #[tokio::test]
    async fn memory_delete_missing_link_is_not_found() {
        let store = MemoryAccountStore::new();
        let result = store.delete("https://x.com/nobody").await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn memory_list_is_sorted_by_name() {
        let store = MemoryAccountStore::new();
        let mut b = account("https://x.com/b", 1, Category::Micro);
        b.name = "Bravo".to_string();
        let mut a = account("https://x.com/a", 1, Category::Micro);
        a.name = "Alpha".to_string();
        store.upsert(&b).await.unwrap();
        store.upsert(&a).await.unwrap();

        let listed = store.list().await.unwrap();
        let names: Vec<String> = listed.into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Alpha".to_string(), "Bravo".to_string()]);
    }
}
