/*
 * Responsibility
 * - Assemble pages + /api/v1 under one Router with AppState
 * - Every route passes through session resolution first
 */
use axum::Router;

use crate::{error::AppError, middleware, state::AppState};

pub mod pages;
pub mod v1;

pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .merge(pages::routes())
        .nest("/api/v1", v1::routes())
        .fallback(|| async { AppError::not_found("route") });

    middleware::auth::session::apply(router, state.clone()).with_state(state)
}
