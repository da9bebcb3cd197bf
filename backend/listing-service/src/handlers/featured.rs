use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::AppState;

/// `GET /featured-listings` and `GET /api/listings/featured`
///
/// `{ "featured": [...up to 6], "recent": [...up to 12] }`. A store failure
/// fails the whole request; no partial feed is returned.
pub async fn featured_listings(state: web::Data<AppState>) -> Result<HttpResponse> {
    let feed = state.featured.featured_feed().await?;
    Ok(HttpResponse::Ok().json(feed))
}
