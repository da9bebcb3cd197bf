/// Saved listings and site feedback.
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::db::{FeedbackStore, ListingStore, UserStore};
use crate::error::{AppError, Result};
use crate::models::{Feedback, FeedbackRequest, Listing};
use crate::services::listings::parse_listing_id;

pub struct SavedListingService {
    users: Arc<dyn UserStore>,
    listings: Arc<dyn ListingStore>,
}

impl SavedListingService {
    pub fn new(users: Arc<dyn UserStore>, listings: Arc<dyn ListingStore>) -> Self {
        Self { users, listings }
    }

    /// Add the listing to the caller's saved set, or remove it if present.
    ///
    /// Saving requires the listing to exist; unsaving does not, so stale
    /// ids can always be cleared.
    pub async fn toggle(&self, user_id: Uuid, raw_listing_id: &str) -> Result<Vec<Uuid>> {
        let listing_id = parse_listing_id(raw_listing_id)?;
        let saved = self.users.saved_listing_ids(user_id).await?;

        if !saved.contains(&listing_id) && self.listings.find_by_id(listing_id).await?.is_none() {
            return Err(AppError::NotFound("Listing not found".to_string()));
        }

        self.users.toggle_saved(user_id, listing_id).await
    }

    /// Full records of the caller's saved listings; deleted ones are skipped.
    pub async fn saved_listings(&self, user_id: Uuid) -> Result<Vec<Listing>> {
        let ids = self.users.saved_listing_ids(user_id).await?;
        self.listings.find_by_ids(&ids).await
    }
}

pub struct FeedbackService {
    store: Arc<dyn FeedbackStore>,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    /// Members may omit their email; guests must give one.
    pub async fn submit(&self, user_id: Option<Uuid>, req: FeedbackRequest) -> Result<Feedback> {
        let text = req
            .feedback
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| AppError::BadRequest("Feedback is required".to_string()))?
            .to_string();

        let email = req
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        if user_id.is_none() && email.is_none() {
            return Err(AppError::BadRequest("Email is required for guests".to_string()));
        }

        FeedbackRequest {
            email: email.clone(),
            feedback: Some(text.clone()),
        }
        .validate()?;

        let feedback = Feedback {
            id: Uuid::new_v4(),
            user_id,
            email,
            feedback: text,
            created_at: Utc::now(),
        };
        let saved = self.store.insert(&feedback).await?;
        tracing::info!(feedback_id = %saved.id, member = user_id.is_some(), "feedback stored");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::listing::sample_listing;

    #[tokio::test]
    async fn test_toggle_requires_existing_listing_to_save() {
        let store = Arc::new(MemoryStore::new());
        let listing = sample_listing("Plot", Uuid::new_v4());
        ListingStore::insert(store.as_ref(), &listing).await.unwrap();
        let service = SavedListingService::new(store.clone(), store.clone());
        let user = Uuid::new_v4();

        assert!(matches!(
            service.toggle(user, &Uuid::new_v4().to_string()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.toggle(user, "bad").await,
            Err(AppError::BadRequest(_))
        ));

        let id = listing.id.to_string();
        assert_eq!(service.toggle(user, &id).await.unwrap(), vec![listing.id]);
        assert_eq!(service.saved_listings(user).await.unwrap(), vec![listing.clone()]);
        assert!(service.toggle(user, &id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_rules() {
        let store = Arc::new(MemoryStore::new());
        let service = FeedbackService::new(store.clone());

        let missing = FeedbackRequest {
            email: Some("guest@example.com".into()),
            feedback: Some("   ".into()),
        };
        assert_eq!(
            service.submit(None, missing).await.unwrap_err().to_string(),
            "Feedback is required"
        );

        let guest_without_email = FeedbackRequest {
            email: None,
            feedback: Some("Great site".into()),
        };
        assert_eq!(
            service
                .submit(None, guest_without_email)
                .await
                .unwrap_err()
                .to_string(),
            "Email is required for guests"
        );

        let member = Uuid::new_v4();
        let saved = service
            .submit(
                Some(member),
                FeedbackRequest {
                    email: None,
                    feedback: Some("Love the map view".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.user_id, Some(member));
        assert_eq!(store.feedback_entries().await.len(), 1);
    }
}
