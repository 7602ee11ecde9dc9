//! Admin handlers. Every route here sits behind
//! [`require_admin`](super::middleware::require_admin).

use super::error::ApiError;
use super::AppState;
use crate::policy::access::AdminIdentity;
use crate::protocol::models::{KeyInventory, UserSummary};
use crate::store::document::{BlacklistEntry, RedeemCode};
use crate::VicatError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/admin/redeem-codes`.
#[derive(Debug, Deserialize)]
pub struct IssueCodesRequest {
    #[serde(default)]
    count: Option<usize>,
}

/// Response of `POST /api/admin/redeem-codes`.
#[derive(Debug, Serialize, Deserialize)]
pub struct IssueCodesResponse {
    /// The new codes, in issue order.
    pub codes: Vec<String>,
}

/// Body of `POST /api/admin/blacklist`.
#[derive(Debug, Deserialize)]
pub struct BlacklistRequest {
    #[serde(default)]
    key: String,
}

/// `POST /api/admin/redeem-codes`
pub async fn issue_codes(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminIdentity>,
    payload: Result<Json<IssueCodesRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssueCodesResponse>), ApiError> {
    let Json(req) = payload?;
    let count = req.count.ok_or(VicatError::MissingField("count"))?;
    let codes = state
        .blocking(move |server| server.keys().issue_redeem_codes(count))
        .await?;
    tracing::info!(admin = %admin.username, count, "Redeem codes issued");
    Ok((StatusCode::CREATED, Json(IssueCodesResponse { codes })))
}

/// `GET /api/admin/redeem-codes`
pub async fn list_codes(State(state): State<AppState>) -> Result<Json<Vec<RedeemCode>>, ApiError> {
    let codes = state
        .blocking(|server| server.keys().list_all_redeem_codes())
        .await?;
    Ok(Json(codes))
}

/// `DELETE /api/admin/redeem-codes/{code}`
pub async fn delete_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .blocking(move |server| server.keys().delete_redeem_code(&code))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/admin/keys`
pub async fn list_keys(State(state): State<AppState>) -> Result<Json<KeyInventory>, ApiError> {
    let inventory = state
        .blocking(|server| server.keys().list_all_keys())
        .await?;
    Ok(Json(inventory))
}

/// `GET /api/admin/users`
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = state
        .blocking(|server| server.keys().list_all_users())
        .await?;
    Ok(Json(users))
}

/// `POST /api/admin/blacklist`
pub async fn blacklist(
    State(state): State<AppState>,
    payload: Result<Json<BlacklistRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BlacklistEntry>), ApiError> {
    let Json(req) = payload?;
    let key = req.key.trim().to_string();
    if key.is_empty() {
        return Err(VicatError::MissingField("key").into());
    }
    let entry = state
        .blocking(move |server| server.keys().blacklist_key(&key))
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
