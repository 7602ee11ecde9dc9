//! Public key check and user key handlers.

use super::error::ApiError;
use super::AppState;
use crate::policy::access::AuthenticatedUser;
use crate::protocol::models::{KeyView, Verdict};
use crate::VicatError;
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/keys/check`.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    key: String,
}

/// Result of a key check.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    /// `ok` or `denied`.
    pub status: String,
    /// Human-readable outcome.
    pub message: String,
}

impl From<Verdict> for CheckResponse {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Ok => Self {
                status: "ok".to_string(),
                message: "Key is valid".to_string(),
            },
            Verdict::Denied(reason) => Self {
                status: "denied".to_string(),
                message: reason.message().to_string(),
            },
        }
    }
}

/// Body of `POST /api/user/redeem`.
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    #[serde(default)]
    code: String,
}

/// Response of `POST /api/user/redeem`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RedeemResponse {
    /// The newly issued key.
    pub key: String,
}

/// `POST /api/keys/check`
///
/// A missing or blank key is simply not a valid key.
pub async fn check(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<CheckResponse>, ApiError> {
    let Json(req) = payload?;
    let key = req.key.trim().to_string();
    let verdict = state
        .blocking(move |server| server.keys().check_key(&key))
        .await?;
    Ok(Json(verdict.into()))
}

/// `POST /api/user/redeem`
pub async fn redeem(
    State(state): State<AppState>,
    Extension(authed): Extension<AuthenticatedUser>,
    payload: Result<Json<RedeemRequest>, JsonRejection>,
) -> Result<Json<RedeemResponse>, ApiError> {
    let Json(req) = payload?;
    let code = req.code.trim().to_string();
    if code.is_empty() {
        return Err(VicatError::MissingField("code").into());
    }
    let user_id = authed.user.id;
    let key = state
        .blocking(move |server| server.keys().redeem(&code, user_id))
        .await?;
    Ok(Json(RedeemResponse { key }))
}

/// `GET /api/user/keys`
pub async fn my_keys(
    State(state): State<AppState>,
    Extension(authed): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<KeyView>>, ApiError> {
    let user_id = authed.user.id;
    let keys = state
        .blocking(move |server| server.keys().list_user_keys(user_id))
        .await?;
    Ok(Json(keys))
}
