//! In-process store backing every storage trait.
//!
//! Mirrors the PostgreSQL semantics the handlers rely on: newest-first
//! ordering, case-insensitive email uniqueness and search, and removal of
//! saved references when a listing is deleted.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FeedbackStore, ListingStore, UserStore};
use crate::error::{AppError, Result};
use crate::models::{Feedback, Listing, User};

#[derive(Default)]
struct Inner {
    listings: Vec<Listing>,
    users: Vec<User>,
    saved: HashMap<Uuid, Vec<Uuid>>,
    feedback: Vec<Feedback>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored feedback, oldest first.
    pub async fn feedback_entries(&self) -> Vec<Feedback> {
        self.inner.read().await.feedback.clone()
    }
}

fn newest_first(listings: &mut [Listing]) {
    listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn find_eligible_featured(&self) -> Result<Vec<Listing>> {
        let inner = self.inner.read().await;
        Ok(inner
            .listings
            .iter()
            .filter(|l| l.is_featured && l.featured_paid_amount > 0.0)
            .cloned()
            .collect())
    }

    async fn find_recent_excluding(
        &self,
        exclude: &HashSet<Uuid>,
        limit: i64,
    ) -> Result<Vec<Listing>> {
        let inner = self.inner.read().await;
        let mut recent: Vec<Listing> = inner
            .listings
            .iter()
            .filter(|l| !exclude.contains(&l.id))
            .cloned()
            .collect();
        newest_first(&mut recent);
        recent.truncate(limit.max(0) as usize);
        Ok(recent)
    }

    async fn insert(&self, listing: &Listing) -> Result<Listing> {
        let mut inner = self.inner.write().await;
        if inner.listings.iter().any(|l| l.id == listing.id) {
            return Err(AppError::Conflict(format!("listing {} already exists", listing.id)));
        }
        inner.listings.push(listing.clone());
        Ok(listing.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>> {
        let inner = self.inner.read().await;
        Ok(inner.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Listing>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.listings.iter().find(|l| l.id == *id).cloned())
            .collect())
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Listing>> {
        let inner = self.inner.read().await;
        let mut owned: Vec<Listing> = inner
            .listings
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut owned);
        Ok(owned)
    }

    async fn update(&self, listing: &Listing) -> Result<Option<Listing>> {
        let mut inner = self.inner.write().await;
        let Some(existing) = inner.listings.iter_mut().find(|l| l.id == listing.id) else {
            return Ok(None);
        };
        let (user_id, created_at) = (existing.user_id, existing.created_at);
        *existing = Listing {
            user_id,
            created_at,
            ..listing.clone()
        };
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.listings.len();
        inner.listings.retain(|l| l.id != id);
        let removed = inner.listings.len() < before;
        if removed {
            for saved in inner.saved.values_mut() {
                saved.retain(|listing_id| *listing_id != id);
            }
        }
        Ok(removed)
    }

    async fn page(&self, limit: i64, offset: i64) -> Result<Vec<Listing>> {
        let inner = self.inner.read().await;
        let mut all = inner.listings.clone();
        newest_first(&mut all);
        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.inner.read().await.listings.len() as i64)
    }

    async fn search(&self, query: &str) -> Result<Vec<Listing>> {
        let needle = query.to_lowercase();
        let inner = self.inner.read().await;
        let mut found: Vec<Listing> = inner
            .listings
            .iter()
            .filter(|l| contains_ci(&l.title, &needle) || contains_ci(&l.location, &needle))
            .cloned()
            .collect();
        newest_first(&mut found);
        Ok(found)
    }

    async fn location_suggestions(&self, query: &str) -> Result<Vec<String>> {
        let needle = query.to_lowercase();
        let inner = self.inner.read().await;
        let locations: BTreeSet<String> = inner
            .listings
            .iter()
            .filter(|l| contains_ci(&l.location, &needle))
            .map(|l| l.location.clone())
            .collect();
        Ok(locations.into_iter().collect())
    }

    async fn random(&self, size: i64, exclude_owner: Option<Uuid>) -> Result<Vec<Listing>> {
        let inner = self.inner.read().await;
        let candidates: Vec<&Listing> = inner
            .listings
            .iter()
            .filter(|l| exclude_owner.map_or(true, |owner| l.user_id != owner))
            .collect();
        let picked = candidates
            .choose_multiple(&mut rand::thread_rng(), size.max(0) as usize)
            .map(|l| (*l).clone())
            .collect();
        Ok(picked)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<User> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict("Email already registered.".to_string()));
        }
        inner.users.push(user.clone());
        Ok(user.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn saved_listing_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner.saved.get(&user_id).cloned().unwrap_or_default())
    }

    async fn toggle_saved(&self, user_id: Uuid, listing_id: Uuid) -> Result<Vec<Uuid>> {
        let mut inner = self.inner.write().await;
        let saved = inner.saved.entry(user_id).or_default();
        if let Some(pos) = saved.iter().position(|id| *id == listing_id) {
            saved.remove(pos);
        } else {
            saved.push(listing_id);
        }
        Ok(saved.clone())
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn insert(&self, feedback: &Feedback) -> Result<Feedback> {
        self.inner.write().await.feedback.push(feedback.clone());
        Ok(feedback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::listing::sample_listing;
    use chrono::{Duration, Utc};

    async fn seeded(titles: &[&str]) -> (MemoryStore, Vec<Listing>) {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let base = Utc::now();
        let mut listings = Vec::new();
        for (n, title) in titles.iter().enumerate() {
            let mut listing = sample_listing(title, owner);
            listing.created_at = base + Duration::seconds(n as i64);
            ListingStore::insert(&store, &listing).await.unwrap();
            listings.push(listing);
        }
        (store, listings)
    }

    #[tokio::test]
    async fn test_recent_excludes_and_orders() {
        let (store, listings) = seeded(&["A", "B", "C", "D"]).await;
        let exclude: HashSet<Uuid> = [listings[0].id, listings[1].id].into_iter().collect();

        let recent = store.find_recent_excluding(&exclude, 12).await.unwrap();
        let titles: Vec<&str> = recent.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["D", "C"]);

        let capped = store
            .find_recent_excluding(&HashSet::new(), 2)
            .await
            .unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn test_page_and_count() {
        let (store, _) = seeded(&["A", "B", "C", "D", "E"]).await;
        assert_eq!(store.count().await.unwrap(), 5);

        let first = store.page(2, 0).await.unwrap();
        let second = store.page(2, 2).await.unwrap();
        let third = store.page(2, 4).await.unwrap();
        assert_eq!(first[0].title, "E");
        assert_eq!(second[0].title, "C");
        assert_eq!(third.len(), 1);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let (store, mut listings) = seeded(&["Lake View", "Hill Top"]).await;
        listings[1].location = "Lonavala".to_string();
        store.update(&listings[1]).await.unwrap();

        assert_eq!(store.search("lake").await.unwrap().len(), 1);
        assert_eq!(store.search("LONA").await.unwrap().len(), 1);
        assert_eq!(store.search("").await.unwrap().len(), 2);

        let suggestions = store.location_suggestions("").await.unwrap();
        assert_eq!(suggestions, vec!["Lonavala".to_string(), "Pune".to_string()]);
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_created_at() {
        let (store, listings) = seeded(&["A"]).await;
        let mut changed = listings[0].clone();
        changed.user_id = Uuid::new_v4();
        changed.title = "Renamed".to_string();

        let updated = store.update(&changed).await.unwrap().unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.user_id, listings[0].user_id);
        assert_eq!(updated.created_at, listings[0].created_at);

        let missing = sample_listing("ghost", Uuid::new_v4());
        assert!(store.update(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_clears_saved_references() {
        let (store, listings) = seeded(&["A", "B"]).await;
        let user = Uuid::new_v4();
        store.toggle_saved(user, listings[0].id).await.unwrap();
        store.toggle_saved(user, listings[1].id).await.unwrap();

        assert!(store.delete(listings[0].id).await.unwrap());
        assert!(!store.delete(listings[0].id).await.unwrap());
        assert_eq!(
            store.saved_listing_ids(user).await.unwrap(),
            vec![listings[1].id]
        );
    }

    #[tokio::test]
    async fn test_toggle_saved_round_trip() {
        let store = MemoryStore::new();
        let (user, listing) = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(store.toggle_saved(user, listing).await.unwrap(), vec![listing]);
        assert!(store.toggle_saved(user, listing).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_random_excludes_owner() {
        let (store, listings) = seeded(&["A", "B", "C"]).await;
        let owner = listings[0].user_id;

        assert!(store.random(5, Some(owner)).await.unwrap().is_empty());
        assert_eq!(store.random(5, None).await.unwrap().len(), 3);
        assert_eq!(store.random(2, None).await.unwrap().len(), 2);
    }
}
