//! HTTP request surface.
//!
//! The core is synchronous: password hashing, the
//! [`Vault`](crate::store::Vault) lock and file I/O all block. Handlers and
//! guards reach it only through [`AppState::blocking`], which runs the call
//! on tokio's blocking pool.

pub mod admin;
pub mod auth;
pub mod error;
pub mod keys;
pub mod middleware;

use crate::manager::KeyServer;
use crate::VicatError;
use error::ApiError;
use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// The key server every handler drives.
    pub server: Arc<KeyServer>,
}

impl AppState {
    /// Run a core call off the async workers.
    pub async fn blocking<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: FnOnce(&KeyServer) -> Result<T, VicatError> + Send + 'static,
        T: Send + 'static,
    {
        let server = Arc::clone(&self.server);
        tokio::task::spawn_blocking(move || call(&server))
            .await
            .map_err(|e| ApiError::Task(e.to_string()))?
            .map_err(ApiError::from)
    }
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/keys/check", post(keys::check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout));

    let user = Router::new()
        .route("/api/user/redeem", post(keys::redeem))
        .route("/api/user/keys", get(keys::my_keys))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_user));

    let admin = Router::new()
        .route(
            "/api/admin/redeem-codes",
            post(admin::issue_codes).get(admin::list_codes),
        )
        .route("/api/admin/redeem-codes/{code}", delete(admin::delete_code))
        .route("/api/admin/keys", get(admin::list_keys))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/blacklist", post(admin::blacklist))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin));

    Router::new()
        .merge(public)
        .merge(user)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, label) = match state.blocking(|server| server.vault().read(|_| ())).await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            tracing::error!(error = ?e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };
    (
        status,
        Json(json!({
            "status": label,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
