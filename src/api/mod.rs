mod handlers;
mod middleware;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::AdminCredentials;
use crate::db::Database;
use crate::session::SessionRegistry;

pub use middleware::SESSION_COOKIE;

/// Maximum request body size (64KB). Bodies are buffered in full before
/// parsing, so they get a hard cap.
pub const MAX_BODY_SIZE: usize = 65_536;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionRegistry,
    pub admin: Arc<AdminCredentials>,
    pub static_dir: PathBuf,
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/items", get(handlers::list_items))
        .route("/add", post(handlers::add_item))
        .route("/delete", post(handlers::delete_item))
        .route("/edit", post(handlers::edit_item))
        // Unknown /api paths 404, but still from behind the session gate
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout))
        .nest("/api", api)
        // Any other GET resolves against the document root
        .fallback(handlers::static_file)
        .method_not_allowed_fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
                .layer(CorsLayer::permissive())
                .layer(CookieManagerLayer::new()),
        )
        .with_state(state)
}
