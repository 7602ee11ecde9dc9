//! HTTP tests driving the router in-process.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tower::ServiceExt;
use vicat_keys::api::{create_router, AppState};
use vicat_keys::crypto::credential::HashCost;
use vicat_keys::store::document::Document;
use vicat_keys::store::memory::MemoryStore;
use vicat_keys::store::DocumentStore;
use vicat_keys::{KeyServer, VicatError};

const ADMIN_USER: &str = "admin";
const ADMIN_PASS: &str = "adminpw";

fn app() -> Router {
    let server = KeyServer::with_store(MemoryStore::new(), HashCost::minimal()).unwrap();
    server.accounts().ensure_admin(ADMIN_USER, ADMIN_PASS).unwrap();
    create_router(AppState {
        server: Arc::new(server),
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

fn with_admin(mut request: Request<Body>, password: &str) -> Request<Body> {
    let headers = request.headers_mut();
    headers.insert("x-admin-username", ADMIN_USER.parse().unwrap());
    headers.insert("x-admin-password", password.parse().unwrap());
    request
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn register_and_login(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        post_json(
            "/api/auth/register",
            json!({ "username": username, "password": "pw123456" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        post_json(
            "/api/auth/login",
            json!({ "username": username, "password": "pw123456" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
    body["sessionToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn full_flow_over_http() {
    let app = app();
    let token = register_and_login(&app, "alice1").await;

    let (status, body) = send(
        &app,
        with_admin(
            post_json("/api/admin/redeem-codes", json!({ "count": 2 })),
            ADMIN_PASS,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let code = body["codes"][0].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        with_bearer(post_json("/api/user/redeem", json!({ "code": code })), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let key = body["key"].as_str().unwrap().to_string();

    let (status, body) = send(&app, post_json("/api/keys/check", json!({ "key": key }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, with_bearer(get("/api/user/keys"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["key"], key.as_str());

    let (status, _) = send(
        &app,
        with_admin(
            post_json("/api/admin/blacklist", json!({ "key": key })),
            ADMIN_PASS,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, post_json("/api/keys/check", json!({ "key": key }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "denied");
    assert_eq!(body["message"], "Key has been blacklisted");

    let (status, body) = send(&app, with_admin(get("/api/admin/keys"), ADMIN_PASS)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active_keys"].as_array().unwrap().len(), 0);
    assert_eq!(body["blacklist"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        with_bearer(post_json("/api/user/redeem", json!({ "code": code })), &token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn admin_routes_require_credentials() {
    let app = app();

    let (status, _) = send(&app, get("/api/admin/users")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, with_admin(get("/api/admin/users"), "wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, with_admin(get("/api/admin/users"), ADMIN_PASS)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admin_login_returns_no_token() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({ "username": ADMIN_USER, "password": ADMIN_PASS }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
    assert!(body.get("sessionToken").is_none());
}

#[tokio::test]
async fn user_routes_require_session() {
    let app = app();

    let (status, _) = send(&app, get("/api/user/keys")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, with_bearer(get("/api/user/keys"), "bogus")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_invalidates_token() {
    let app = app();
    let token = register_and_login(&app, "bob").await;

    let (status, _) = send(
        &app,
        with_bearer(post_json("/api/auth/logout", json!({})), &token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, with_bearer(get("/api/user/keys"), &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn validation_errors_are_bad_request() {
    let app = app();

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/register",
            json!({ "username": "bad name", "password": "pw" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        with_admin(
            post_json("/api/admin/redeem-codes", json!({ "count": 101 })),
            ADMIN_PASS,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

}

#[tokio::test]
async fn blank_key_check_is_denied() {
    let app = app();
    for body in [json!({}), json!({ "key": "   " })] {
        let (status, body) = send(&app, post_json("/api/keys/check", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "denied");
        assert_eq!(body["message"], "Key is invalid");
    }
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app();
    register_and_login(&app, "carol").await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/register",
            json!({ "username": "carol", "password": "x" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn delete_unknown_code_is_not_found() {
    let app = app();
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/admin/redeem-codes/NOPE00000000")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, with_admin(request, ADMIN_PASS)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Store whose next load, once armed, parks the calling thread until released.
struct GatedStore {
    inner: MemoryStore,
    armed: Arc<AtomicBool>,
    entered: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl DocumentStore for GatedStore {
    fn load(&self) -> Result<Document, VicatError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            if let Some(entered) = self.entered.lock().unwrap().take() {
                let _ = entered.send(());
            }
            let _ = self.release.lock().unwrap().recv();
        }
        self.inner.load()
    }

    fn save(&mut self, document: &Document) -> Result<(), VicatError> {
        self.inner.save(document)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn stalled_admin_request_leaves_runtime_free() {
    let armed = Arc::new(AtomicBool::new(false));
    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let store = GatedStore {
        inner: MemoryStore::new(),
        armed: Arc::clone(&armed),
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(release_rx),
    };

    let server = KeyServer::with_store(store, HashCost::minimal()).unwrap();
    server.accounts().ensure_admin(ADMIN_USER, ADMIN_PASS).unwrap();
    let app = create_router(AppState {
        server: Arc::new(server),
    });

    armed.store(true, Ordering::SeqCst);
    let admin_app = app.clone();
    let admin = tokio::spawn(async move {
        send(&admin_app, with_admin(get("/api/admin/users"), ADMIN_PASS)).await
    });

    // The admin guard is now parked inside the store.
    entered_rx.await.unwrap();

    let other = tokio::time::timeout(Duration::from_secs(5), tokio::spawn(async { 7 })).await;
    release_tx.send(()).unwrap();

    assert_eq!(other.expect("worker thread was blocked").unwrap(), 7);
    let (status, _) = admin.await.unwrap();
    assert_eq!(status, StatusCode::OK);
}
