/// Account handlers, mounted behind `JwtAuthMiddleware`
use actix_web::{web, HttpResponse};

use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{SavedListingsResponse, UserProfile};
use crate::services::SavedListingService;
use crate::AppState;

fn saved_service(state: &AppState) -> SavedListingService {
    SavedListingService::new(state.users.clone(), state.listings.clone())
}

pub async fn me(state: web::Data<AppState>, user: UserId) -> Result<HttpResponse> {
    let profile = state
        .users
        .find_by_id(user.0)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let saved_listings = state.users.saved_listing_ids(user.0).await?;

    Ok(HttpResponse::Ok().json(UserProfile {
        user: profile,
        saved_listings,
    }))
}

pub async fn toggle_save(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let saved_listings = saved_service(&state).toggle(user.0, &path).await?;
    Ok(HttpResponse::Ok().json(SavedListingsResponse { saved_listings }))
}

pub async fn saved(state: web::Data<AppState>, user: UserId) -> Result<HttpResponse> {
    let listings = saved_service(&state).saved_listings(user.0).await?;
    Ok(HttpResponse::Ok().json(listings))
}
