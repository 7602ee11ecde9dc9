//! Guard middleware for protected routes.
//!
//! - [`require_user`] reads `Authorization: Bearer <token>` and injects an
//!   [`AuthenticatedUser`](crate::policy::access::AuthenticatedUser) extension.
//! - [`require_admin`] reads `X-Admin-Username` / `X-Admin-Password` on every
//!   request and injects an [`AdminIdentity`](crate::policy::access::AdminIdentity)
//!   extension.

use super::error::ApiError;
use super::AppState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Header carrying the admin username.
pub const ADMIN_USERNAME_HEADER: &str = "x-admin-username";

/// Header carrying the admin password.
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Session-token guard.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers());
    let authed = state
        .blocking(move |server| server.gate().user_guard(token.as_deref()))
        .await?;

    request.extensions_mut().insert(authed);
    Ok(next.run(request).await)
}

/// Per-request admin credential guard.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let username = header_value(request.headers(), ADMIN_USERNAME_HEADER);
    let password = header_value(request.headers(), ADMIN_PASSWORD_HEADER);
    let identity = state
        .blocking(move |server| {
            server
                .gate()
                .admin_guard(username.as_deref(), password.as_deref())
        })
        .await?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
