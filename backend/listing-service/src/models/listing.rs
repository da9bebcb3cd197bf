use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};

/// A land parcel offered on the marketplace.
///
/// Serialized in camelCase; `listing_type` goes over the wire as `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub price: f64,
    pub area: String,
    #[serde(rename = "type")]
    pub listing_type: String,
    pub image_url: String,

    pub direction: Option<String>,
    pub soil: Option<String>,
    pub water: Option<String>,
    pub legal: Option<String>,

    pub owner_name: Option<String>,
    pub owner_contact: Option<String>,
    pub owner_email: Option<String>,
    pub owner_address: Option<String>,
    pub owner_notes: Option<String>,

    pub landmarks: Option<String>,
    pub road_distance: Option<String>,
    pub env_notes: Option<String>,
    pub dev_potential: Option<String>,

    pub description: Option<String>,
    pub is_featured: bool,
    pub featured_paid_amount: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub user_id: Uuid,

    pub certificate_id: String,
    pub token_id: String,
    pub current_owner_address: String,

    pub created_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Fields submitted with a new listing (multipart text parts).
#[derive(Debug, Clone, Default, Validate)]
pub struct NewListing {
    #[validate(length(min = 1, max = 255, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "location is required"))]
    pub location: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(length(min = 1, message = "area is required"))]
    pub area: String,
    #[validate(length(min = 1, message = "type is required"))]
    pub listing_type: String,

    pub direction: Option<String>,
    pub soil: Option<String>,
    pub water: Option<String>,
    pub legal: Option<String>,

    pub owner_name: Option<String>,
    pub owner_contact: Option<String>,
    #[validate(email(message = "ownerEmail must be a valid email"))]
    pub owner_email: Option<String>,
    pub owner_address: Option<String>,
    pub owner_notes: Option<String>,

    pub landmarks: Option<String>,
    pub road_distance: Option<String>,
    pub env_notes: Option<String>,
    pub dev_potential: Option<String>,

    pub description: Option<String>,
    pub is_featured: bool,
    #[validate(range(min = 0.0, message = "featuredPaidAmount must not be negative"))]
    pub featured_paid_amount: f64,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude out of range"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude out of range"))]
    pub longitude: Option<f64>,

    #[validate(length(min = 1, message = "certificateId is required"))]
    pub certificate_id: String,
    #[validate(length(min = 1, message = "tokenId is required"))]
    pub token_id: String,
    #[validate(length(min = 1, message = "currentOwnerAddress is required"))]
    pub current_owner_address: String,
}

impl NewListing {
    /// Build from multipart text fields keyed by their camelCase names.
    ///
    /// Blank values count as absent. Any `userId`, `imageUrl` or
    /// `createdAt` part is ignored; those are set by the server.
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self> {
        let text = |key: &str| -> Option<String> {
            fields
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let number = |key: &str| -> Result<Option<f64>> {
            match text(key) {
                None => Ok(None),
                Some(raw) => raw
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(Some)
                    .ok_or_else(|| AppError::BadRequest(format!("{} must be a number", key))),
            }
        };

        let price = number("price")?
            .ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;

        Ok(Self {
            title: text("title").unwrap_or_default(),
            location: text("location").unwrap_or_default(),
            price,
            area: text("area").unwrap_or_default(),
            listing_type: text("type").unwrap_or_default(),
            direction: text("direction"),
            soil: text("soil"),
            water: text("water"),
            legal: text("legal"),
            owner_name: text("ownerName"),
            owner_contact: text("ownerContact"),
            owner_email: text("ownerEmail"),
            owner_address: text("ownerAddress"),
            owner_notes: text("ownerNotes"),
            landmarks: text("landmarks"),
            road_distance: text("roadDistance"),
            env_notes: text("envNotes"),
            dev_potential: text("devPotential"),
            description: text("description"),
            is_featured: text("isFeatured").map(|v| parse_flag(&v)).unwrap_or(false),
            featured_paid_amount: number("featuredPaidAmount")?.unwrap_or(0.0),
            latitude: number("latitude")?,
            longitude: number("longitude")?,
            certificate_id: text("certificateId").unwrap_or_default(),
            token_id: text("tokenId").unwrap_or_default(),
            current_owner_address: text("currentOwnerAddress").unwrap_or_default(),
        })
    }

    pub fn into_listing(self, user_id: Uuid, image_url: String) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            title: self.title,
            location: self.location,
            price: self.price,
            area: self.area,
            listing_type: self.listing_type,
            image_url,
            direction: self.direction,
            soil: self.soil,
            water: self.water,
            legal: self.legal,
            owner_name: self.owner_name,
            owner_contact: self.owner_contact,
            owner_email: self.owner_email,
            owner_address: self.owner_address,
            owner_notes: self.owner_notes,
            landmarks: self.landmarks,
            road_distance: self.road_distance,
            env_notes: self.env_notes,
            dev_potential: self.dev_potential,
            description: self.description,
            is_featured: self.is_featured,
            featured_paid_amount: self.featured_paid_amount,
            latitude: self.latitude,
            longitude: self.longitude,
            user_id,
            certificate_id: self.certificate_id,
            token_id: self.token_id,
            current_owner_address: self.current_owner_address,
            created_at: Utc::now(),
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

/// Partial update sent by the listing owner.
///
/// `id`, `userId` and `createdAt` are not part of this type, so a client
/// sending them has no effect.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    #[validate(length(min = 1, max = 255, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "location must not be empty"))]
    pub location: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    #[validate(length(min = 1, message = "area must not be empty"))]
    pub area: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type must not be empty"))]
    pub listing_type: Option<String>,
    #[validate(length(min = 1, message = "imageUrl must not be empty"))]
    pub image_url: Option<String>,

    pub direction: Option<String>,
    pub soil: Option<String>,
    pub water: Option<String>,
    pub legal: Option<String>,

    pub owner_name: Option<String>,
    pub owner_contact: Option<String>,
    #[validate(email(message = "ownerEmail must be a valid email"))]
    pub owner_email: Option<String>,
    pub owner_address: Option<String>,
    pub owner_notes: Option<String>,

    pub landmarks: Option<String>,
    pub road_distance: Option<String>,
    pub env_notes: Option<String>,
    pub dev_potential: Option<String>,

    pub description: Option<String>,
    pub is_featured: Option<bool>,
    #[validate(range(min = 0.0, message = "featuredPaidAmount must not be negative"))]
    pub featured_paid_amount: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude out of range"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude out of range"))]
    pub longitude: Option<f64>,

    #[validate(length(min = 1, message = "certificateId must not be empty"))]
    pub certificate_id: Option<String>,
    #[validate(length(min = 1, message = "tokenId must not be empty"))]
    pub token_id: Option<String>,
    #[validate(length(min = 1, message = "currentOwnerAddress must not be empty"))]
    pub current_owner_address: Option<String>,
}

impl UpdateListingRequest {
    /// Overwrite every field present in the request.
    pub fn apply(self, listing: &mut Listing) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        fn set_opt<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut listing.title, self.title);
        set(&mut listing.location, self.location);
        set(&mut listing.price, self.price);
        set(&mut listing.area, self.area);
        set(&mut listing.listing_type, self.listing_type);
        set(&mut listing.image_url, self.image_url);
        set_opt(&mut listing.direction, self.direction);
        set_opt(&mut listing.soil, self.soil);
        set_opt(&mut listing.water, self.water);
        set_opt(&mut listing.legal, self.legal);
        set_opt(&mut listing.owner_name, self.owner_name);
        set_opt(&mut listing.owner_contact, self.owner_contact);
        set_opt(&mut listing.owner_email, self.owner_email);
        set_opt(&mut listing.owner_address, self.owner_address);
        set_opt(&mut listing.owner_notes, self.owner_notes);
        set_opt(&mut listing.landmarks, self.landmarks);
        set_opt(&mut listing.road_distance, self.road_distance);
        set_opt(&mut listing.env_notes, self.env_notes);
        set_opt(&mut listing.dev_potential, self.dev_potential);
        set_opt(&mut listing.description, self.description);
        set(&mut listing.is_featured, self.is_featured);
        set(&mut listing.featured_paid_amount, self.featured_paid_amount);
        set_opt(&mut listing.latitude, self.latitude);
        set_opt(&mut listing.longitude, self.longitude);
        set(&mut listing.certificate_id, self.certificate_id);
        set(&mut listing.token_id, self.token_id);
        set(&mut listing.current_owner_address, self.current_owner_address);
    }
}

/// `?page=&limit=` for the paginated feed. Kept as raw strings so a
/// malformed value falls back to the default instead of rejecting.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

pub const DEFAULT_PAGE_LIMIT: i64 = 4;
pub const MAX_PAGE_LIMIT: i64 = 100;

impl PageQuery {
    pub fn page(&self) -> i64 {
        parse_positive(self.page.as_deref()).unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        parse_positive(self.limit.as_deref())
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).filter(|n| *n >= 1)
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct ListingPage {
    pub listings: Vec<Listing>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct ListingMutationResponse {
    pub message: String,
    pub listing: Listing,
}

#[cfg(test)]
pub(crate) fn sample_listing(title: &str, user_id: Uuid) -> Listing {
    Listing {
        id: Uuid::new_v4(),
        title: title.to_string(),
        location: "Pune".to_string(),
        price: 250000.0,
        area: "1200 sqft".to_string(),
        listing_type: "Residential".to_string(),
        image_url: "/uploads/1.jpg".to_string(),
        direction: None,
        soil: None,
        water: None,
        legal: None,
        owner_name: None,
        owner_contact: None,
        owner_email: None,
        owner_address: None,
        owner_notes: None,
        landmarks: None,
        road_distance: None,
        env_notes: None,
        dev_potential: None,
        description: None,
        is_featured: false,
        featured_paid_amount: 0.0,
        latitude: None,
        longitude: None,
        user_id,
        certificate_id: "CERT-1".to_string(),
        token_id: "TOKEN-1".to_string(),
        current_owner_address: "0xabc".to_string(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete_form() -> HashMap<String, String> {
        form(&[
            ("title", "Riverside plot"),
            ("location", "Nashik"),
            ("price", "450000"),
            ("area", "2 acres"),
            ("type", "Agricultural"),
            ("isFeatured", "true"),
            ("featuredPaidAmount", "7000"),
            ("latitude", "19.99"),
            ("certificateId", "CERT-9"),
            ("tokenId", "42"),
            ("currentOwnerAddress", "0xowner"),
            ("userId", "ignored"),
        ])
    }

    #[test]
    fn test_from_form_parses_typed_fields() {
        let listing = NewListing::from_form(&complete_form()).unwrap();
        assert_eq!(listing.title, "Riverside plot");
        assert_eq!(listing.price, 450000.0);
        assert!(listing.is_featured);
        assert_eq!(listing.featured_paid_amount, 7000.0);
        assert_eq!(listing.latitude, Some(19.99));
        assert_eq!(listing.longitude, None);
        assert!(listing.validate().is_ok());
    }

    #[test]
    fn test_from_form_rejects_bad_numbers() {
        let mut fields = complete_form();
        fields.insert("price".into(), "cheap".into());
        assert!(matches!(
            NewListing::from_form(&fields),
            Err(AppError::BadRequest(_))
        ));

        fields.remove("price");
        assert!(NewListing::from_form(&fields).is_err());
    }

    #[test]
    fn test_missing_required_text_fails_validation() {
        let mut fields = complete_form();
        fields.insert("certificateId".into(), "   ".into());
        let listing = NewListing::from_form(&fields).unwrap();
        assert!(listing.validate().is_err());
    }

    #[test]
    fn test_into_listing_sets_owner_and_image() {
        let owner = Uuid::new_v4();
        let listing = NewListing::from_form(&complete_form())
            .unwrap()
            .into_listing(owner, "/uploads/123.png".into());
        assert_eq!(listing.user_id, owner);
        assert_eq!(listing.image_url, "/uploads/123.png");
    }

    #[test]
    fn test_update_keeps_identity_fields() {
        let owner = Uuid::new_v4();
        let mut listing = sample_listing("Old", owner);
        let id = listing.id;
        let created_at = listing.created_at;

        let update: UpdateListingRequest = serde_json::from_value(serde_json::json!({
            "title": "New",
            "id": Uuid::new_v4(),
            "userId": Uuid::new_v4(),
            "isFeatured": true,
            "featuredPaidAmount": 12000.0
        }))
        .unwrap();
        update.apply(&mut listing);

        assert_eq!(listing.title, "New");
        assert_eq!(listing.id, id);
        assert_eq!(listing.user_id, owner);
        assert_eq!(listing.created_at, created_at);
        assert!(listing.is_featured);
        assert_eq!(listing.featured_paid_amount, 12000.0);
        assert_eq!(listing.location, "Pune");
    }

    #[test]
    fn test_update_validation() {
        let update = UpdateListingRequest {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateListingRequest {
            latitude: Some(120.0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_page_query_defaults() {
        let q = PageQuery::default();
        assert_eq!((q.page(), q.limit(), q.offset()), (1, 4, 0));

        let q = PageQuery {
            page: Some("abc".into()),
            limit: Some("-3".into()),
        };
        assert_eq!((q.page(), q.limit()), (1, 4));

        let q = PageQuery {
            page: Some("3".into()),
            limit: Some("10".into()),
        };
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn test_serializes_camel_case_with_type() {
        let listing = sample_listing("Plot", Uuid::new_v4());
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["type"], "Residential");
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("featuredPaidAmount").is_some());
        assert!(json.get("listing_type").is_none());
    }
}
