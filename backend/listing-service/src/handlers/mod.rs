/// HTTP handlers for listing-service
pub mod auth;
pub mod featured;
pub mod feedback;
pub mod health;
pub mod listings;
pub mod uploads;
pub mod users;

pub use auth::{login, protected_route, refresh, register};
pub use featured::featured_listings;
pub use feedback::submit_feedback;
pub use health::{health_summary, liveness_check};
pub use listings::{
    count_listings, create_listing, delete_listing, get_listing, list_listings, my_listings,
    random_lands, search_listings, search_suggestions, update_listing,
};
pub use uploads::serve_upload;
pub use users::{me, saved, toggle_save};
