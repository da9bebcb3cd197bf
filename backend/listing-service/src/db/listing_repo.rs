use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::{like_pattern, ListingStore, PgStore};
use crate::error::Result;
use crate::models::Listing;

const LISTING_COLUMNS: &str = "id, title, location, price, area, listing_type, image_url, \
    direction, soil, water, legal, owner_name, owner_contact, owner_email, owner_address, \
    owner_notes, landmarks, road_distance, env_notes, dev_potential, description, is_featured, \
    featured_paid_amount, latitude, longitude, user_id, certificate_id, token_id, \
    current_owner_address, created_at";

#[async_trait]
impl ListingStore for PgStore {
    async fn find_eligible_featured(&self) -> Result<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             WHERE is_featured = TRUE AND featured_paid_amount > 0"
        );
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .fetch_all(self.pool())
            .await?;
        Ok(listings)
    }

    async fn find_recent_excluding(
        &self,
        exclude: &HashSet<Uuid>,
        limit: i64,
    ) -> Result<Vec<Listing>> {
        let exclude: Vec<Uuid> = exclude.iter().copied().collect();
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             WHERE NOT (id = ANY($1)) \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .bind(&exclude)
            .bind(limit)
            .fetch_all(self.pool())
            .await?;
        Ok(listings)
    }

    async fn insert(&self, listing: &Listing) -> Result<Listing> {
        let sql = format!(
            "INSERT INTO listings ({LISTING_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                     $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30) \
             RETURNING {LISTING_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Listing>(&sql)
            .bind(listing.id)
            .bind(&listing.title)
            .bind(&listing.location)
            .bind(listing.price)
            .bind(&listing.area)
            .bind(&listing.listing_type)
            .bind(&listing.image_url)
            .bind(&listing.direction)
            .bind(&listing.soil)
            .bind(&listing.water)
            .bind(&listing.legal)
            .bind(&listing.owner_name)
            .bind(&listing.owner_contact)
            .bind(&listing.owner_email)
            .bind(&listing.owner_address)
            .bind(&listing.owner_notes)
            .bind(&listing.landmarks)
            .bind(&listing.road_distance)
            .bind(&listing.env_notes)
            .bind(&listing.dev_potential)
            .bind(&listing.description)
            .bind(listing.is_featured)
            .bind(listing.featured_paid_amount)
            .bind(listing.latitude)
            .bind(listing.longitude)
            .bind(listing.user_id)
            .bind(&listing.certificate_id)
            .bind(&listing.token_id)
            .bind(&listing.current_owner_address)
            .bind(listing.created_at)
            .fetch_one(self.pool())
            .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1");
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(listing)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, Listing>(&sql)
            .bind(ids)
            .fetch_all(self.pool())
            .await?;

        let mut by_id: HashMap<Uuid, Listing> = rows.into_iter().map(|l| (l.id, l)).collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await?;
        Ok(listings)
    }

    async fn update(&self, listing: &Listing) -> Result<Option<Listing>> {
        let sql = format!(
            "UPDATE listings SET \
                title = $2, location = $3, price = $4, area = $5, listing_type = $6, \
                image_url = $7, direction = $8, soil = $9, water = $10, legal = $11, \
                owner_name = $12, owner_contact = $13, owner_email = $14, owner_address = $15, \
                owner_notes = $16, landmarks = $17, road_distance = $18, env_notes = $19, \
                dev_potential = $20, description = $21, is_featured = $22, \
                featured_paid_amount = $23, latitude = $24, longitude = $25, \
                certificate_id = $26, token_id = $27, current_owner_address = $28 \
             WHERE id = $1 \
             RETURNING {LISTING_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Listing>(&sql)
            .bind(listing.id)
            .bind(&listing.title)
            .bind(&listing.location)
            .bind(listing.price)
            .bind(&listing.area)
            .bind(&listing.listing_type)
            .bind(&listing.image_url)
            .bind(&listing.direction)
            .bind(&listing.soil)
            .bind(&listing.water)
            .bind(&listing.legal)
            .bind(&listing.owner_name)
            .bind(&listing.owner_contact)
            .bind(&listing.owner_email)
            .bind(&listing.owner_address)
            .bind(&listing.owner_notes)
            .bind(&listing.landmarks)
            .bind(&listing.road_distance)
            .bind(&listing.env_notes)
            .bind(&listing.dev_potential)
            .bind(&listing.description)
            .bind(listing.is_featured)
            .bind(listing.featured_paid_amount)
            .bind(listing.latitude)
            .bind(listing.longitude)
            .bind(&listing.certificate_id)
            .bind(&listing.token_id)
            .bind(&listing.current_owner_address)
            .fetch_optional(self.pool())
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn page(&self, limit: i64, offset: i64) -> Result<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        );
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?;
        Ok(listings)
    }

    async fn count(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(self.pool())
            .await?;
        Ok(total)
    }

    async fn search(&self, query: &str) -> Result<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             WHERE title ILIKE $1 OR location ILIKE $1 \
             ORDER BY created_at DESC"
        );
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .bind(like_pattern(query))
            .fetch_all(self.pool())
            .await?;
        Ok(listings)
    }

    async fn location_suggestions(&self, query: &str) -> Result<Vec<String>> {
        let locations: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT location FROM listings WHERE location ILIKE $1 ORDER BY location",
        )
        .bind(like_pattern(query))
        .fetch_all(self.pool())
        .await?;
        Ok(locations)
    }

    async fn random(&self, size: i64, exclude_owner: Option<Uuid>) -> Result<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             WHERE $2::uuid IS NULL OR user_id <> $2 \
             ORDER BY random() \
             LIMIT $1"
        );
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .bind(size)
            .bind(exclude_owner)
            .fetch_all(self.pool())
            .await?;
        Ok(listings)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }
}
