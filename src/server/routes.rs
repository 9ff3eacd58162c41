//! Route table.

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

use super::handlers;
use super::AppState;

/// Build the router for a subjects root.
pub fn create_router(state: AppState) -> Router {
    let files = ServeDir::new(&state.root);

    Router::new()
        .route("/", get(handlers::index))
        .route("/subjects/:subject", get(handlers::subject_page))
        .route("/static/style.css", get(handlers::stylesheet))
        .nest_service("/files", files)
        .with_state(state)
}
