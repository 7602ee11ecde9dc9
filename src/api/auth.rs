//! Registration, login and logout handlers.

use super::error::ApiError;
use super::middleware::bearer_token;
use super::AppState;
use crate::accounts::{LoginOutcome, Registration};
use crate::protocol::models::UserSummary;
use crate::AuthError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    email: Option<String>,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Which kind of principal logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The single admin.
    Admin,
    /// A registered user.
    User,
}

/// Response of `POST /api/auth/login`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Who logged in.
    pub role: Role,
    /// Bearer token; users only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    /// Session expiry; users only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// The logged-in user; users only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let Json(req) = payload?;
    let registration = Registration {
        username: req.username,
        password: req.password,
        email: req.email,
    };
    let summary = state
        .blocking(move |server| server.accounts().register(registration))
        .await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let outcome = state
        .blocking(move |server| server.accounts().login(&req.username, &req.password))
        .await?;
    let response = match outcome {
        LoginOutcome::Admin => LoginResponse {
            role: Role::Admin,
            session_token: None,
            expires_at: None,
            user: None,
        },
        LoginOutcome::User { user, session } => LoginResponse {
            role: Role::User,
            session_token: Some(session.token),
            expires_at: Some(session.expires_at),
            user: Some(user),
        },
    };
    Ok(Json(response))
}

/// `POST /api/auth/logout`
///
/// Takes the bearer token directly rather than through the session guard,
/// so an expired token can still be discarded. Unknown tokens succeed.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
        .map_err(crate::VicatError::from)?;
    state
        .blocking(move |server| server.accounts().logout(&token))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
