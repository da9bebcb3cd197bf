/// HTTP middleware utilities for listing-service
///
/// Provides bearer-token authentication (as a scope middleware and as
/// extractors) and request metrics.
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::body::EitherBody;
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::AppError;
use crate::metrics::http::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::AppState;

// =====================================================================
// JWT Authentication
// =====================================================================

/// Extracted user identifier stored in request extensions after auth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// Caller identity on routes where signing in is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeUserId(pub Option<Uuid>);

fn bearer_token(req: &HttpRequest) -> Option<Result<&str, AppError>> {
    let header = req.headers().get("Authorization")?;
    Some(
        header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".to_string())),
    )
}

fn authenticate(req: &HttpRequest, token: &str) -> Result<Uuid, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state not configured".to_string()))?;

    state.jwt.user_id_from_access_token(token).map_err(|e| {
        tracing::debug!(error = %e, "rejected access token");
        AppError::Unauthorized("Invalid token".to_string())
    })
}

/// Resolve the caller from extensions, falling back to the header.
fn resolve_user(req: &HttpRequest) -> Result<Option<Uuid>, AppError> {
    if let Some(UserId(id)) = req.extensions().get::<UserId>() {
        return Ok(Some(*id));
    }
    match bearer_token(req) {
        None => Ok(None),
        Some(token) => authenticate(req, token?).map(Some),
    }
}

/// Actix middleware that rejects requests without a valid access token.
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let resolved = resolve_user(req.request()).and_then(|user| {
                user.ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
            });
            let user_id = match resolved {
                Ok(id) => id,
                Err(err) => return Ok(req.error_response(err).map_into_right_body()),
            };

            req.extensions_mut().insert(UserId(user_id));

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve_user(req).and_then(|user| {
            user.map(UserId)
                .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
        }))
    }
}

/// A present but invalid token is still rejected with 401.
impl FromRequest for MaybeUserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve_user(req).map(MaybeUserId))
    }
}

// =====================================================================
// Metrics middleware
// =====================================================================

pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let path = req.path().to_string();
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = start.elapsed();

            let status = match &res {
                Ok(resp) => resp.status().as_u16().to_string(),
                Err(err) => err.as_response_error().status_code().as_u16().to_string(),
            };
            HTTP_REQUESTS_TOTAL
                .with_label_values(&[method.as_str(), status.as_str()])
                .inc();
            HTTP_REQUEST_DURATION_SECONDS
                .with_label_values(&[method.as_str()])
                .observe(elapsed.as_secs_f64());

            tracing::debug!(
                %method,
                %path,
                %status,
                elapsed_ms = elapsed.as_millis() as u64,
                "request completed"
            );
            res
        })
    }
}
