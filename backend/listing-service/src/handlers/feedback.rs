use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::Result;
use crate::middleware::MaybeUserId;
use crate::models::FeedbackRequest;
use crate::services::FeedbackService;
use crate::AppState;

/// `POST /api/feedback`; the bearer token is optional.
pub async fn submit_feedback(
    state: web::Data<AppState>,
    user: MaybeUserId,
    body: web::Json<FeedbackRequest>,
) -> Result<HttpResponse> {
    FeedbackService::new(state.feedback.clone())
        .submit(user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({ "message": "Feedback saved successfully" })))
}
