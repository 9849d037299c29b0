//! Database operations for the `accounts` table.

use chrono::{DateTime, Utc};
use infludb_core::{Category, Platform, TrackedAccount};
use sqlx::SqlitePool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `accounts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub platform: String,
    pub followers: i64,
    pub category: String,
    pub updated_at: DateTime<Utc>,
}

impl AccountRow {
    /// Convert the stored strings back into domain types.
    ///
    /// An unrecognised category is read as `pending` so the account gets
    /// picked up again by the next batch.
    #[must_use]
    pub fn into_tracked(self) -> TrackedAccount {
        let category = Category::from_stored(&self.category).unwrap_or_else(|| {
            tracing::warn!(
                link = %self.link,
                category = %self.category,
                "unrecognised stored category; treating as pending"
            );
            Category::Pending
        });
        TrackedAccount {
            platform: Platform::from_tag(&self.platform),
            followers: u64::try_from(self.followers).unwrap_or(0),
            name: self.name,
            link: self.link,
            category,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert an account or, if the link already exists, overwrite it.
///
/// Last write wins for every column; repeated calls with the same input
/// leave exactly one row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_account(pool: &SqlitePool, account: &TrackedAccount) -> Result<(), DbError> {
    let followers = i64::try_from(account.followers).unwrap_or(i64::MAX);
    sqlx::query(
        "INSERT INTO accounts (name, link, platform, followers, category, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         ON CONFLICT(link) DO UPDATE SET \
             name = excluded.name, \
             platform = excluded.platform, \
             followers = excluded.followers, \
             category = excluded.category, \
             updated_at = excluded.updated_at",
    )
    .bind(&account.name)
    .bind(&account.link)
    .bind(account.platform.as_str())
    .bind(followers)
    .bind(account.category.as_str())
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete the account with the given link.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matched, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn delete_account(pool: &SqlitePool, link: &str) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM accounts WHERE link = ?1")
        .bind(link)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Returns all accounts, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_accounts(pool: &SqlitePool) -> Result<Vec<AccountRow>, DbError> {
    let rows = sqlx::query_as::<_, AccountRow>(
        "SELECT id, name, link, platform, followers, category, updated_at \
         FROM accounts \
         ORDER BY name, link",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single account by link, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_account(pool: &SqlitePool, link: &str) -> Result<Option<AccountRow>, DbError> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT id, name, link, platform, followers, category, updated_at \
         FROM accounts \
         WHERE link = ?1",
    )
    .bind(link)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
