/// Listing Service Library
///
/// Backend for the LandSure land marketplace: listings, accounts, saved
/// listings, feedback, and the weighted featured-listing feed.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Listing, user and feedback records plus request DTOs
/// - `services`: Featured selection and listing business rules
/// - `db`: Storage traits with PostgreSQL and in-memory backends
/// - `middleware`: JWT authentication and request metrics
/// - `storage`: Image uploads on local disk
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};

use crypto_core::JwtKeys;
use std::sync::Arc;

use db::{FeedbackStore, ListingStore, UserStore};
use services::FeaturedService;
use storage::UploadStore;

/// Shared state handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub listings: Arc<dyn ListingStore>,
    pub users: Arc<dyn UserStore>,
    pub feedback: Arc<dyn FeedbackStore>,
    pub featured: FeaturedService,
    pub jwt: Arc<JwtKeys>,
    pub uploads: UploadStore,
    /// Mark the refresh cookie `Secure`
    pub cookie_secure: bool,
}

impl AppState {
    /// Wire every store trait to the same backend.
    pub fn new<S>(store: Arc<S>, jwt: JwtKeys, uploads: UploadStore, cookie_secure: bool) -> Self
    where
        S: ListingStore + UserStore + FeedbackStore + 'static,
    {
        let listings: Arc<dyn ListingStore> = store.clone();
        Self {
            featured: FeaturedService::new(listings.clone()),
            listings,
            users: store.clone(),
            feedback: store,
            jwt: Arc::new(jwt),
            uploads,
            cookie_secure,
        }
    }
}
