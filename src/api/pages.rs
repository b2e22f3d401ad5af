/*
 * Responsibility
 * - Role-gated areas (/admin, /editor, /artist, /account) and /login
 * - Rendering is not done here: an allowed request gets a small JSON description
 *   of the area and the caller, a rejected one is redirected by the area guard
 */
use axum::{Json, Router, extract::OriginalUri, routing::get};
use serde::Serialize;

use crate::{
    api::v1::extractors::AuthCtxExtractor,
    middleware::auth::area_guard,
    services::access::{LOGIN_PATH, ProtectedArea, RoleResolution, home_of},
    services::identity::Principal,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct AreaPage {
    pub area: ProtectedArea,
    pub path: String,
    pub principal: Option<Principal>,
}

#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub authenticated: bool,
    // Where an already signed-in caller belongs.
    pub home: Option<&'static str>,
}

pub fn routes() -> Router<AppState> {
    let router = Router::new().route(LOGIN_PATH, get(login));

    ProtectedArea::ALL
        .into_iter()
        .fold(router, |router, area| router.nest(area.path(), area_routes(area)))
}

fn area_routes(area: ProtectedArea) -> Router<AppState> {
    let page = move |AuthCtxExtractor(ctx): AuthCtxExtractor, OriginalUri(uri): OriginalUri| async move {
        Json(AreaPage {
            area,
            path: uri.path().to_string(),
            principal: ctx.principal,
        })
    };

    let router = Router::new()
        .route("/", get(page.clone()))
        .route("/{*rest}", get(page));

    area_guard::apply(router, area)
}

async fn login(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<LoginPage> {
    let home = match ctx.role() {
        RoleResolution::Authenticated(role) => Some(home_of(role).path()),
        RoleResolution::Unauthenticated => None,
    };

    Json(LoginPage {
        authenticated: ctx.principal.is_some(),
        home,
    })
}
