//! Shared fixtures for the HTTP integration tests.
//!
//! Every test runs against `MemoryStore` and a throwaway upload directory,
//! so no database or container is needed.
#![allow(dead_code, unused_macros)]

use chrono::{Duration, Utc};
use crypto_core::JwtKeys;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use listing_service::db::{ListingStore, MemoryStore, UserStore};
use listing_service::models::{AccountType, GovtIdType, Listing, User};
use listing_service::security::hash_password;
use listing_service::storage::UploadStore;
use listing_service::AppState;

pub const UPLOAD_LIMIT: usize = 1024 * 1024;
pub const PASSWORD: &str = "correct-horse-battery";
pub const BOUNDARY: &str = "----landsure-test-boundary";

/// Build the full route table over `$state`.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(listing_service::routes::configure),
        )
        .await
    };
}

pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub upload_dir: TempDir,
}

pub fn context() -> TestContext {
    let store = Arc::new(MemoryStore::new());
    let upload_dir = tempfile::tempdir().expect("create upload dir");
    let jwt = JwtKeys::new("integration-access-secret", "integration-refresh-secret")
        .expect("jwt keys");
    let state = AppState::new(
        store.clone(),
        jwt,
        UploadStore::new(upload_dir.path(), UPLOAD_LIMIT),
        false,
    );

    TestContext {
        state,
        store,
        upload_dir,
    }
}

pub async fn seed_user(store: &MemoryStore, email: &str) -> User {
    let user = User {
        id: Uuid::new_v4(),
        username: email.split('@').next().unwrap_or("tester").to_string(),
        contact: None,
        email: email.to_string(),
        password_hash: hash_password(PASSWORD).expect("hash password"),
        account_type: AccountType::Seller,
        govt_id_type: GovtIdType::Aadhar,
        govt_id_number: "1234-5678-9012".to_string(),
        created_at: Utc::now(),
    };
    UserStore::insert(store, &user).await.expect("insert user")
}

/// `Authorization` header carrying a fresh access token for `user_id`.
pub fn bearer(state: &AppState, user_id: Uuid) -> (&'static str, String) {
    let token = state
        .jwt
        .generate_access_token(user_id)
        .expect("generate access token");
    ("Authorization", format!("Bearer {}", token))
}

/// A listing created `age_minutes` ago.
pub fn listing(title: &str, owner: Uuid, age_minutes: i64) -> Listing {
    Listing {
        id: Uuid::new_v4(),
        title: title.to_string(),
        location: "Pune".to_string(),
        price: 450_000.0,
        area: "2 acres".to_string(),
        listing_type: "Agricultural".to_string(),
        image_url: "/uploads/seed.jpg".to_string(),
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
        user_id: owner,
        certificate_id: "CERT-1".to_string(),
        token_id: "1".to_string(),
        current_owner_address: "0xowner".to_string(),
        created_at: Utc::now() - Duration::minutes(age_minutes),
    }
}

pub fn featured(title: &str, owner: Uuid, amount: f64, age_minutes: i64) -> Listing {
    Listing {
        is_featured: true,
        featured_paid_amount: amount,
        ..listing(title, owner, age_minutes)
    }
}

pub async fn seed_listing(store: &MemoryStore, listing: Listing) -> Listing {
    ListingStore::insert(store, &listing)
        .await
        .expect("insert listing")
}

/// `multipart/form-data` body with text parts and an optional file part.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> (&'static str, String) {
    (
        "Content-Type",
        format!("multipart/form-data; boundary={}", BOUNDARY),
    )
}
