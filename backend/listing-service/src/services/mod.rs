/// Business logic layer for listing-service
pub mod accounts;
pub mod engagement;
pub mod featured;
pub mod listings;

pub use accounts::{AccountService, LoginTokens};
pub use engagement::{FeedbackService, SavedListingService};
pub use featured::{
    eligible_ids, featured_weight, select_featured, FeaturedCandidate, FeaturedFeed,
    FeaturedService, FEATURED_LIMIT, RECENT_LIMIT,
};
pub use listings::{parse_listing_id, ListingService, RANDOM_LANDS_SIZE};
