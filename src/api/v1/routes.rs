/*
 * Responsibility
 * - URL layout of /api/v1
 * - Session resolution is applied by the caller (api::router), not here
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{downloads::download, health::health};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/downloads/{*path}", get(download))
}
