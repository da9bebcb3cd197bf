/// Listing HTTP handlers
///
/// - `GET /api/listings/search-suggestions?q=`
/// - `GET /api/listings/search?q=`
/// - `GET /api/listings?page=&limit=`
/// - `GET /api/listings/count`
/// - `GET /api/listings/random-lands`
/// - `GET /api/listings/my-listings`
/// - `GET|PUT|DELETE /api/listings/{id}`
/// - `POST /api/listings` (multipart with a `tokenImages` file)
use actix_multipart::{Field, Multipart};
use actix_web::http::header::{self, ContentDisposition};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde_json::json;
use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::middleware::{MaybeUserId, UserId};
use crate::models::{
    ListingMutationResponse, NewListing, PageQuery, SearchQuery, UpdateListingRequest,
};
use crate::services::ListingService;
use crate::storage::public_url;
use crate::AppState;

/// Name of the multipart part carrying the listing image.
pub const IMAGE_FIELD: &str = "tokenImages";

/// Longest accepted text part.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

fn service(state: &AppState) -> ListingService {
    ListingService::new(state.listings.clone())
}

pub async fn search_suggestions(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let locations = service(&state).location_suggestions(&query.q).await?;
    Ok(HttpResponse::Ok().json(locations))
}

pub async fn search_listings(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let listings = service(&state).search(&query.q).await?;
    Ok(HttpResponse::Ok().json(listings))
}

pub async fn list_listings(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = service(&state).page(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn count_listings(state: web::Data<AppState>) -> Result<HttpResponse> {
    let total = service(&state).count().await?;
    Ok(HttpResponse::Ok().json(json!({ "total": total })))
}

/// Signed-in callers never see their own listings here.
pub async fn random_lands(
    state: web::Data<AppState>,
    viewer: MaybeUserId,
) -> Result<HttpResponse> {
    let listings = service(&state).random_lands(viewer.0).await?;
    Ok(HttpResponse::Ok().json(listings))
}

pub async fn my_listings(state: web::Data<AppState>, user: UserId) -> Result<HttpResponse> {
    let listings = service(&state).mine(user.0).await?;
    Ok(HttpResponse::Ok().json(listings))
}

pub async fn get_listing(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let listing = service(&state).get(&path).await?;
    Ok(HttpResponse::Ok().json(listing))
}

pub async fn update_listing(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<String>,
    body: web::Json<UpdateListingRequest>,
) -> Result<HttpResponse> {
    let listing = service(&state)
        .update(&path, user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ListingMutationResponse {
        message: "Listing updated".to_string(),
        listing,
    }))
}

pub async fn delete_listing(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    service(&state).delete(&path, user.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Listing deleted successfully" })))
}

struct UploadedImage {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

pub async fn create_listing(
    state: web::Data<AppState>,
    user: UserId,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let max_bytes = state.uploads.max_bytes();
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut image: Option<UploadedImage> = None;

    while let Some(field) = payload.next().await {
        let mut field = field?;
        let disposition = content_disposition(&field);
        let name = disposition
            .as_ref()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name == IMAGE_FIELD {
            let file_name = disposition
                .as_ref()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);
            let bytes = read_field(&mut field, max_bytes).await?;
            image = Some(UploadedImage { file_name, bytes });
        } else if !name.is_empty() {
            let bytes = read_field(&mut field, MAX_TEXT_FIELD_BYTES).await?;
            let value = String::from_utf8(bytes)
                .map_err(|_| AppError::BadRequest(format!("{} must be UTF-8 text", name)))?;
            fields.insert(name, value);
        }
    }

    let image = image.ok_or_else(|| {
        AppError::BadRequest(format!("An image file is required in '{}'", IMAGE_FIELD))
    })?;
    let new_listing = NewListing::from_form(&fields)?;

    // Validate before touching the disk so rejected requests leave no file.
    validator::Validate::validate(&new_listing)?;
    let stored = state
        .uploads
        .save(image.file_name.as_deref(), &image.bytes)
        .await?;

    let listing = match service(&state)
        .create(user.0, new_listing, public_url(&stored))
        .await
    {
        Ok(listing) => listing,
        Err(e) => {
            // No row points at the image, so it must not outlive the request.
            if let Err(cleanup) = state.uploads.remove(&stored).await {
                tracing::warn!(
                    file = %stored,
                    error = %cleanup,
                    "failed to remove orphaned upload"
                );
            }
            return Err(e);
        }
    };

    Ok(HttpResponse::Created().json(ListingMutationResponse {
        message: "Listing created successfully".to_string(),
        listing,
    }))
}

fn content_disposition(field: &Field) -> Option<ContentDisposition> {
    field
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| ContentDisposition::from_raw(value).ok())
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if data.len() + chunk.len() > limit {
            return Err(AppError::BadRequest(format!(
                "Multipart field exceeds {} bytes",
                limit
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}
