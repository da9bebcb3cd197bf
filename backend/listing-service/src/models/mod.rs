/// Data models for listing-service
pub mod feedback;
pub mod listing;
pub mod user;

pub use feedback::{Feedback, FeedbackRequest};
pub use listing::{
    Listing, ListingMutationResponse, ListingPage, NewListing, PageQuery, SearchQuery,
    UpdateListingRequest,
};
pub use user::{
    AccountType, AuthResponse, GovtIdType, LoginRequest, RefreshResponse, RegisterRequest,
    SavedListingsResponse, User, UserProfile,
};
