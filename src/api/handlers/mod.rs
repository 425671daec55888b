use std::path::{Component, Path as FsPath};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use thiserror::Error;
use tower_cookies::{
    cookie::{time::Duration as CookieDuration, SameSite},
    Cookie, Cookies,
};

use crate::models::*;
use crate::session::SESSION_TTL_SECS;

use super::middleware::SESSION_COOKIE;
use super::AppState;

// ============================================================
// Error Handling
// ============================================================

/// Errors surfaced to API clients as JSON `{"error": <message>}`.
///
/// Validation and not-found messages are safe to expose. Internal errors
/// (connection or query failures) are logged in full server-side and the
/// client only sees a generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {e:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

/// 404 for routes matching nothing. Also used when a known path is hit
/// with the wrong method.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// Literal 302. axum's `Redirect::to` emits 303; the login flow and the
/// static client are specified against 302.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

// ============================================================
// Auth
// ============================================================

/// Form body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Response {
    if !state.admin.verify(&form.username, &form.password) {
        tracing::warn!(username = %form.username, "Failed login attempt");
        return found("/login.html?error=1");
    }

    let token = state.sessions.create(&form.username).await;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_max_age(CookieDuration::seconds(SESSION_TTL_SECS));
    cookie.set_same_site(SameSite::Lax);
    cookies.add(cookie);

    found("/")
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Response {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await;
    }

    // Removal cookie: same name and path, Max-Age=0
    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    cookies.remove(removal);

    found("/login.html")
}

// ============================================================
// Pages and static files
// ============================================================

/// `GET /` serves the main page only with a live session.
pub async fn index(State(state): State<AppState>, cookies: Cookies) -> Response {
    let authed = match cookies.get(SESSION_COOKIE) {
        Some(cookie) => state.sessions.lookup(cookie.value()).await.is_some(),
        None => false,
    };

    if !authed {
        return found("/login.html");
    }

    serve_file(&state, "index.html").await
}

/// Fallback handler: any GET not matched by an exact route resolves
/// against the document root. `/login.html` is reachable without a
/// session. Anything else is an unknown route.
pub async fn static_file(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        return not_found().await.into_response();
    }

    serve_file(&state, uri.path().trim_start_matches('/')).await
}

async fn serve_file(state: &AppState, rel: &str) -> Response {
    // Only plain path segments: rejects `..`, absolute paths, and prefixes,
    // so the lookup cannot escape the document root.
    let rel_path = FsPath::new(rel);
    if rel_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return not_found().await.into_response();
    }

    let path = state.static_dir.join(rel_path);
    match tokio::fs::read(&path).await {
        Ok(contents) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], contents).into_response()
        }
        Err(_) => not_found().await.into_response(),
    }
}

// ============================================================
// Items
// ============================================================

pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    state.db.list_items().map(Json).map_err(ApiError::from)
}

pub async fn add_item(
    State(state): State<AppState>,
    payload: Result<Json<AddItemInput>, JsonRejection>,
) -> Result<Json<AddItemResponse>, ApiError> {
    let Json(input) = payload?;

    let text = input.text.trim();
    if text.is_empty() {
        return Err(ApiError::Validation("Text must not be empty".to_string()));
    }

    let id = state.db.add_item(text)?;
    Ok(Json(AddItemResponse { id }))
}

pub async fn delete_item(
    State(state): State<AppState>,
    payload: Result<Json<DeleteItemInput>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(input) = payload?;

    // No existence check: deleting an absent id reads as success to the
    // client either way.
    state.db.delete_item(input.id)?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn edit_item(
    State(state): State<AppState>,
    payload: Result<Json<EditItemInput>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(input) = payload?;

    let text = input.text.trim();
    if text.is_empty() {
        return Err(ApiError::Validation("Text must not be empty".to_string()));
    }

    if !state.db.update_item(input.id, text)? {
        return Err(ApiError::NotFound("Item not found".to_string()));
    }

    Ok(Json(SuccessResponse { success: true }))
}
