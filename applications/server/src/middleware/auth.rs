/// Authentication middleware
use crate::{
    error::ServerError,
    services::{AuthService, Principal},
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

/// Verified caller stored in request extensions
/// Can be used as an extractor in handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

impl AuthenticatedUser {
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

/// Cookie set by the CrateDrop login flow, used by `<audio>` elements
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Middleware that extracts and validates JWT from Authorization header,
/// falling back to the `access_token` cookie when the header is absent
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = match request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(auth_header) => auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                ServerError::Auth("Authorization header must be Bearer <token>".to_string())
            })?
            .to_string(),
        None => CookieJar::from_headers(request.headers())
            .get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ServerError::Auth("Authorization header required".to_string()))?,
    };

    let principal = auth_service.verify_access_token(&token)?;
    tracing::debug!(user_id = %principal.user_id, role = %principal.role, "authenticated request");

    request
        .extensions_mut()
        .insert(AuthenticatedUser(principal));

    Ok(next.run(request).await)
}

/// Implement FromRequestParts so AuthenticatedUser can be used as an extractor
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ServerError::Auth("Not authenticated".to_string()))
    }
}
