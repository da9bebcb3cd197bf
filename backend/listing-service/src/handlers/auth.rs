/// Authentication handlers
///
/// Login sets an HttpOnly `jwt` cookie carrying the 7-day refresh token;
/// `POST /refresh` trades it for a 10-minute access token.
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use crypto_core::jwt::REFRESH_TOKEN_EXPIRY_DAYS;

use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{AuthResponse, LoginRequest, RefreshResponse, RegisterRequest};
use crate::services::AccountService;
use crate::AppState;

pub const REFRESH_COOKIE: &str = "jwt";

fn service(state: &AppState) -> AccountService {
    AccountService::new(state.users.clone(), state.jwt.clone())
}

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let (user, token) = service(&state).register(body.into_inner()).await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".to_string(),
        token,
        username: user.username,
        account_type: user.account_type,
        email: user.email,
    }))
}

pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let (user, tokens) = service(&state).login(body.into_inner()).await?;

    let cookie = Cookie::build(REFRESH_COOKIE, tokens.refresh_token)
        .http_only(true)
        .secure(state.cookie_secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(CookieDuration::days(REFRESH_TOKEN_EXPIRY_DAYS))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        message: "Login successful".to_string(),
        token: tokens.access_token,
        username: user.username,
        account_type: user.account_type,
        email: user.email,
    }))
}

pub async fn refresh(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse> {
    let cookie = req
        .cookie(REFRESH_COOKIE)
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    let access_token = service(&state).refresh(cookie.value())?;
    Ok(HttpResponse::Ok().json(RefreshResponse { access_token }))
}

pub async fn protected_route(user: UserId) -> HttpResponse {
    tracing::debug!(user_id = %user.0, "protected route accessed");
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("You have accessed a protected route!")
}
