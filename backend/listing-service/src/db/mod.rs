/// Storage layer for listing-service
///
/// Handlers and services depend on the traits below. `PgStore` backs them
/// with PostgreSQL; `MemoryStore` keeps everything in process and is selected
/// with `STORE_BACKEND=memory` (local demos, integration tests).
pub mod feedback_repo;
pub mod listing_repo;
pub mod memory;
pub mod user_repo;

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Feedback, Listing, User};

pub use memory::MemoryStore;

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Listings with `is_featured` set and a positive paid amount.
    async fn find_eligible_featured(&self) -> Result<Vec<Listing>>;

    /// Newest listings whose id is not in `exclude`, `created_at` descending.
    async fn find_recent_excluding(&self, exclude: &HashSet<Uuid>, limit: i64)
        -> Result<Vec<Listing>>;

    async fn insert(&self, listing: &Listing) -> Result<Listing>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>>;

    /// Listings for `ids`, in the order given. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Listing>>;

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Listing>>;

    /// Replace every mutable column of an existing listing.
    async fn update(&self, listing: &Listing) -> Result<Option<Listing>>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Page of listings, newest first.
    async fn page(&self, limit: i64, offset: i64) -> Result<Vec<Listing>>;
    async fn count(&self) -> Result<i64>;

    /// Case-insensitive substring match on title or location.
    async fn search(&self, query: &str) -> Result<Vec<Listing>>;

    /// Distinct locations containing `query`, case-insensitive, sorted.
    async fn location_suggestions(&self, query: &str) -> Result<Vec<String>>;

    /// Up to `size` listings in random order, optionally skipping one owner.
    async fn random(&self, size: i64, exclude_owner: Option<Uuid>) -> Result<Vec<Listing>>;

    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `AppError::Conflict` when the email is taken.
    async fn insert(&self, user: &User) -> Result<User>;

    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Saved listing ids in the order they were saved.
    async fn saved_listing_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    /// Add `listing_id` if absent, remove it if present; returns the new list.
    async fn toggle_saved(&self, user_id: Uuid, listing_id: Uuid) -> Result<Vec<Uuid>>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn insert(&self, feedback: &Feedback) -> Result<Feedback>;
}

/// PostgreSQL-backed store implementing every storage trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pune"), "%pune%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern(""), "%%");
    }
}
