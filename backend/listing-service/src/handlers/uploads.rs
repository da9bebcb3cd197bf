use actix_web::http::header;
use actix_web::{web, HttpResponse};

use crate::error::{AppError, Result};
use crate::storage::content_type_for;
use crate::AppState;

/// `GET /uploads/{filename}`
pub async fn serve_upload(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let file_name = path.into_inner();
    let bytes = state
        .uploads
        .read(&file_name)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&file_name))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}
