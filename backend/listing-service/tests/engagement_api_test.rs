//! Saved listings, profile, feedback, uploads and operational endpoints.

#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{bearer, context, listing, seed_listing, seed_user};

#[actix_web::test]
async fn users_scope_requires_token() {
    let ctx = context();
    let app = test_app!(ctx.state);

    for uri in ["/api/users/me", "/api/users/saved"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 401);
    }
}

#[actix_web::test]
async fn profile_hides_password_hash() {
    let ctx = context();
    let user = seed_user(&ctx.store, "asha@example.com").await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(bearer(&ctx.state, user.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["email"], "asha@example.com");
    assert_eq!(body["savedListings"], json!([]));
    assert!(body.get("password_hash").is_none());
    assert!(body.get("passwordHash").is_none());

    // Token for an account that no longer exists
    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(bearer(&ctx.state, Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn toggle_save_adds_then_removes() {
    let ctx = context();
    let user = seed_user(&ctx.store, "asha@example.com").await;
    let first = seed_listing(&ctx.store, listing("First", Uuid::new_v4(), 2)).await;
    let second = seed_listing(&ctx.store, listing("Second", Uuid::new_v4(), 1)).await;
    let app = test_app!(ctx.state);

    for id in [first.id, second.id] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/users/toggle-save/{}", id))
            .insert_header(bearer(&ctx.state, user.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/users/saved")
        .insert_header(bearer(&ctx.state, user.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);

    let req = test::TestRequest::post()
        .uri(&format!("/api/users/toggle-save/{}", first.id))
        .insert_header(bearer(&ctx.state, user.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "savedListings": [second.id] }));

    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(bearer(&ctx.state, user.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["savedListings"], json!([second.id]));
}

#[actix_web::test]
async fn toggle_save_rejects_unknown_listing() {
    let ctx = context();
    let user = seed_user(&ctx.store, "asha@example.com").await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/api/users/toggle-save/{}", Uuid::new_v4()))
        .insert_header(bearer(&ctx.state, user.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/users/toggle-save/not-a-uuid")
        .insert_header(bearer(&ctx.state, user.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn deleted_listing_drops_out_of_saved() {
    let ctx = context();
    let user = seed_user(&ctx.store, "asha@example.com").await;
    let owner = seed_user(&ctx.store, "owner@example.com").await;
    let stored = seed_listing(&ctx.store, listing("Short lived", owner.id, 1)).await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri(&format!("/api/users/toggle-save/{}", stored.id))
        .insert_header(bearer(&ctx.state, user.id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/listings/{}", stored.id))
        .insert_header(bearer(&ctx.state, owner.id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/users/saved")
        .insert_header(bearer(&ctx.state, user.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn guest_feedback_needs_email() {
    let ctx = context();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(json!({ "feedback": "Love the map view" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Email is required for guests");

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(json!({ "email": "guest@example.com", "feedback": "Love the map view" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Feedback saved successfully");

    let entries = ctx.store.feedback_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].email.as_deref(), Some("guest@example.com"));
    assert!(entries[0].user_id.is_none());
}

#[actix_web::test]
async fn member_feedback_links_user() {
    let ctx = context();
    let user = seed_user(&ctx.store, "asha@example.com").await;
    let app = test_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header(bearer(&ctx.state, user.id))
        .set_json(json!({ "feedback": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header(bearer(&ctx.state, user.id))
        .set_json(json!({ "feedback": "Please add soil reports" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header(("Authorization", "Bearer forged"))
        .set_json(json!({ "email": "x@example.com", "feedback": "hi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let entries = ctx.store.feedback_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, Some(user.id));
    assert_eq!(entries[0].feedback, "Please add soil reports");
}

#[actix_web::test]
async fn uploads_reject_missing_and_unsafe_names() {
    let ctx = context();
    std::fs::write(ctx.upload_dir.path().join("1700000000000.jpg"), b"jpeg").unwrap();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::get()
        .uri("/uploads/1700000000000.jpg")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "image/jpeg");

    for uri in [
        "/uploads/missing.png",
        "/uploads/..%2FCargo.toml",
        "/uploads/.hidden",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[actix_web::test]
async fn health_metrics_and_unknown_routes() {
    let ctx = context();
    let app = test_app!(ctx.state);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "listing-service");

    let req = test::TestRequest::get().uri("/api/health/live").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "alive": true }));

    let req = test::TestRequest::get().uri("/api/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Route not found");

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(text.contains("listing_http_requests_total"));
}
