/// Listing business rules: id parsing, ownership checks, validation.
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::db::ListingStore;
use crate::error::{AppError, Result};
use crate::models::{Listing, ListingPage, NewListing, PageQuery, UpdateListingRequest};

/// Size of the `random-lands` sample.
pub const RANDOM_LANDS_SIZE: i64 = 5;

pub fn parse_listing_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest("Invalid listing ID".to_string()))
}

pub struct ListingService {
    store: Arc<dyn ListingStore>,
}

impl ListingService {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, raw_id: &str) -> Result<Listing> {
        let id = parse_listing_id(raw_id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))
    }

    /// Load a listing the caller owns: 400 bad id, 404 missing, 403 not owner.
    async fn get_owned(&self, raw_id: &str, user_id: Uuid) -> Result<Listing> {
        let listing = self.get(raw_id).await?;
        if !listing.is_owned_by(user_id) {
            tracing::warn!(
                listing_id = %listing.id,
                user_id = %user_id,
                "rejected change to listing owned by another user"
            );
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }
        Ok(listing)
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        new_listing: NewListing,
        image_url: String,
    ) -> Result<Listing> {
        new_listing.validate()?;
        let listing = new_listing.into_listing(user_id, image_url);
        let created = self.store.insert(&listing).await?;
        tracing::info!(listing_id = %created.id, user_id = %user_id, "listing created");
        Ok(created)
    }

    pub async fn update(
        &self,
        raw_id: &str,
        user_id: Uuid,
        update: UpdateListingRequest,
    ) -> Result<Listing> {
        let mut listing = self.get_owned(raw_id, user_id).await?;
        update.validate()?;
        update.apply(&mut listing);

        let updated = self
            .store
            .update(&listing)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
        tracing::info!(listing_id = %updated.id, "listing updated");
        Ok(updated)
    }

    pub async fn delete(&self, raw_id: &str, user_id: Uuid) -> Result<()> {
        let listing = self.get_owned(raw_id, user_id).await?;
        if !self.store.delete(listing.id).await? {
            return Err(AppError::NotFound("Listing not found".to_string()));
        }
        tracing::info!(listing_id = %listing.id, "listing deleted");
        Ok(())
    }

    pub async fn page(&self, query: &PageQuery) -> Result<ListingPage> {
        let total = self.store.count().await?;
        let listings = self.store.page(query.limit(), query.offset()).await?;
        Ok(ListingPage { listings, total })
    }

    pub async fn count(&self) -> Result<i64> {
        self.store.count().await
    }

    pub async fn mine(&self, user_id: Uuid) -> Result<Vec<Listing>> {
        self.store.find_by_owner(user_id).await
    }

    pub async fn random_lands(&self, viewer: Option<Uuid>) -> Result<Vec<Listing>> {
        self.store.random(RANDOM_LANDS_SIZE, viewer).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Listing>> {
        self.store.search(query.trim()).await
    }

    pub async fn location_suggestions(&self, query: &str) -> Result<Vec<String>> {
        self.store.location_suggestions(query.trim()).await
    }
}
