/// Route table for listing-service.
///
/// Shared by `main` and the integration tests so both serve the same app.
use actix_web::{error::InternalError, web, HttpResponse, ResponseError};

use crate::error::AppError;
use crate::handlers;
use crate::metrics::serve_metrics;
use crate::middleware::{JwtAuthMiddleware, MetricsMiddleware};

/// Malformed bodies and query strings answer with the standard error shape.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err, _req| {
            let app_err = AppError::BadRequest(format!("Invalid request body: {}", err));
            let response = app_err.error_response();
            InternalError::from_response(err, response).into()
        })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let app_err = AppError::BadRequest(format!("Invalid query string: {}", err));
        let response = app_err.error_response();
        InternalError::from_response(err, response).into()
    })
}

async fn not_found() -> HttpResponse {
    AppError::NotFound("Route not found".to_string()).error_response()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/metrics", web::get().to(serve_metrics))
        .route(
            "/featured-listings",
            web::get().to(handlers::featured_listings),
        )
        .route("/refresh", web::post().to(handlers::refresh))
        .route("/uploads/{filename}", web::get().to(handlers::serve_upload))
        .service(
            web::scope("/api")
                .wrap(MetricsMiddleware)
                .route("/health", web::get().to(handlers::health_summary))
                .route("/health/live", web::get().to(handlers::liveness_check))
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(handlers::register))
                        .route("/login", web::post().to(handlers::login))
                        .route("/protected-route", web::get().to(handlers::protected_route)),
                )
                .service(
                    web::scope("/listings")
                        .route(
                            "/search-suggestions",
                            web::get().to(handlers::search_suggestions),
                        )
                        .route("/search", web::get().to(handlers::search_listings))
                        .route("/featured", web::get().to(handlers::featured_listings))
                        .route("/count", web::get().to(handlers::count_listings))
                        .route("/random-lands", web::get().to(handlers::random_lands))
                        .route("/my-listings", web::get().to(handlers::my_listings))
                        .service(
                            web::resource("")
                                .route(web::get().to(handlers::list_listings))
                                .route(web::post().to(handlers::create_listing)),
                        )
                        .service(
                            web::resource("/{id}")
                                .route(web::get().to(handlers::get_listing))
                                .route(web::put().to(handlers::update_listing))
                                .route(web::delete().to(handlers::delete_listing)),
                        ),
                )
                .service(
                    web::scope("/users")
                        .wrap(JwtAuthMiddleware)
                        .route("/me", web::get().to(handlers::me))
                        .route(
                            "/toggle-save/{listing_id}",
                            web::post().to(handlers::toggle_save),
                        )
                        .route("/saved", web::get().to(handlers::saved)),
                )
                .route("/feedback", web::post().to(handlers::submit_feedback))
                .default_service(web::to(not_found)),
        );
}
