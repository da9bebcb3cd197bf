use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(email(message = "Email must be valid"))]
    pub email: Option<String>,
    #[validate(length(max = 5000, message = "Feedback is too long"))]
    pub feedback: Option<String>,
}
