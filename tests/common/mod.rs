//! In-process fake of the admin backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use folio_admin::client::AdminClient;
use folio_admin::config::ClientConfig;
use folio_admin::session::CredentialStore;
use serde_json::{json, Value};

pub const VALID_TOKEN: &str = "valid-token";
pub const EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "password";

/// How `/articles` answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    ServerError,
    Forbidden,
    Slow(Duration),
    SlowUnauthorized(Duration),
}

#[derive(Clone, Default)]
pub struct Backend {
    mode: Arc<Mutex<Mode>>,
    seen_auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl Backend {
    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    fn mode(&self) -> Mode {
        *self.mode.lock().unwrap()
    }

    /// Authorization headers received, in order.
    pub fn seen_auth(&self) -> Vec<Option<String>> {
        self.seen_auth.lock().unwrap().clone()
    }

    pub fn last_auth(&self) -> Option<String> {
        self.seen_auth().last().cloned().flatten()
    }

    fn record(&self, headers: &HeaderMap) -> bool {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let authorized = auth.as_deref() == Some(format!("Bearer {}", VALID_TOKEN).as_str());
        self.seen_auth.lock().unwrap().push(auth);
        authorized
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "unauthorized")
}

pub fn article_json(id: &str, title: &str, slug: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "slug": slug,
        "content": "<p>Body</p>",
        "keywords": ["rust"],
        "tags": null,
        "published": true,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-02T00:00:00Z"
    })
}

pub fn user_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Eve Holt",
        "email": "eve.holt@example.com",
        "role": "admin",
        "provider": "local",
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match email {
        EMAIL if password == PASSWORD => {
            Json(json!({ "status": "success", "access_token": VALID_TOKEN })).into_response()
        }
        "empty@example.com" => {
            Json(json!({ "status": "success", "access_token": "" })).into_response()
        }
        "pending@example.com" => Json(json!({ "status": "pending" })).into_response(),
        email if !email.contains('@') => {
            error(StatusCode::UNPROCESSABLE_ENTITY, "email is invalid")
        }
        _ => error(StatusCode::UNAUTHORIZED, "invalid credentials"),
    }
}

async fn list_articles(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let authorized = backend.record(&headers);

    match backend.mode() {
        Mode::Normal => {}
        Mode::ServerError => {
            return error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
        }
        Mode::Forbidden => return error(StatusCode::FORBIDDEN, "admins only"),
        Mode::Slow(delay) => tokio::time::sleep(delay).await,
        Mode::SlowUnauthorized(delay) => {
            tokio::time::sleep(delay).await;
            return error(StatusCode::UNAUTHORIZED, "token expired");
        }
    }

    if !authorized {
        return unauthorized();
    }
    Json(json!([
        article_json("1", "Hello World", "hello-world"),
        article_json("2", "Travel Tips", "travel-tips"),
    ]))
    .into_response()
}

async fn create_article(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !backend.record(&headers) {
        return unauthorized();
    }
    let title = body["title"].as_str().unwrap_or_default();
    let slug = body["slug"].as_str().unwrap_or_default();
    if slug.is_empty() {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "slug is required");
    }
    (StatusCode::CREATED, Json(article_json("3", title, slug))).into_response()
}

async fn list_categories(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !backend.record(&headers) {
        return unauthorized();
    }
    Json(json!([
        { "id": 1, "name": "Travel", "slug": "travel", "image": "" },
        { "id": 2, "name": "Food", "slug": "food", "parent_id": 1 },
    ]))
    .into_response()
}

async fn delete_category(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if !backend.record(&headers) {
        return unauthorized();
    }
    if id == 404 {
        return error(StatusCode::NOT_FOUND, "category not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_users(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !backend.record(&headers) {
        return unauthorized();
    }
    if params.get("page").map(String::as_str) == Some("99") {
        return Json(json!({ "data": { "users": null } })).into_response();
    }
    Json(json!({ "data": { "users": [user_json("u1"), user_json("u2")] } })).into_response()
}

async fn get_user(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !backend.record(&headers) {
        return unauthorized();
    }
    Json(json!({ "data": user_json(&id) })).into_response()
}

/// Serve the fake backend on an ephemeral port. Returns the API base URL.
pub async fn spawn(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/articles", get(list_articles).post(create_article))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{id}", delete(delete_category))
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", get(get_user))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    format!("http://{}/api", addr)
}

/// A running fake backend plus a client with its own in-memory session.
pub async fn setup() -> (AdminClient, Backend) {
    let backend = Backend::default();
    let base_url = spawn(backend.clone()).await;
    let client = AdminClient::new(&ClientConfig::new(base_url), CredentialStore::new())
        .expect("Failed to build client");
    (client, backend)
}
