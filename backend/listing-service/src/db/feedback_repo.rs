use async_trait::async_trait;

use super::{FeedbackStore, PgStore};
use crate::error::Result;
use crate::models::Feedback;

#[async_trait]
impl FeedbackStore for PgStore {
    async fn insert(&self, feedback: &Feedback) -> Result<Feedback> {
        let saved = sqlx::query_as::<_, Feedback>(
            "INSERT INTO feedback (id, user_id, email, feedback, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, email, feedback, created_at",
        )
        .bind(feedback.id)
        .bind(feedback.user_id)
        .bind(&feedback.email)
        .bind(&feedback.feedback)
        .bind(feedback.created_at)
        .fetch_one(self.pool())
        .await?;
        Ok(saved)
    }
}
