//! Session gate for the API surface.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use super::handlers::ApiError;
use super::AppState;

/// Name of the session cookie issued on login.
pub const SESSION_COOKIE: &str = "sid";

/// Reject requests that do not carry a live session.
///
/// Applied to every `/api` route. A request is anonymous when the `sid`
/// cookie is absent or its token is not in the registry; anonymous callers
/// get 401 with a JSON body and the handler never runs, so no store
/// operation is performed on their behalf.
pub async fn require_session(
    State(state): State<AppState>,
    cookies: Cookies,
    request: Request,
    next: Next,
) -> Response {
    let live = match cookies.get(SESSION_COOKIE) {
        Some(cookie) => state.sessions.lookup(cookie.value()).await.is_some(),
        None => false,
    };

    if live {
        next.run(request).await
    } else {
        tracing::debug!("Rejected unauthenticated request to {}", request.uri());
        ApiError::Unauthorized.into_response()
    }
}
