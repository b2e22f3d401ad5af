//! Route guard for a protected area.
//!
//! Reads the `AuthCtx` left by the session middleware and either lets the request
//! through or redirects: anonymous callers to `/login`, callers with the wrong role
//! to their own home area. Redirects are silent (no error page).

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};

use crate::api::v1::extractors::AuthCtx;
use crate::services::access::{GuardDecision, ProtectedArea, RoleResolution, guard};
use crate::state::AppState;

/// Guard every route of `router` with `area`'s role policy.
///
/// `route_layer` so unmatched paths still fall through to the 404 fallback.
pub fn apply(router: Router<AppState>, area: ProtectedArea) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(area, area_guard))
}

async fn area_guard(
    State(area): State<ProtectedArea>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let resolution = req
        .extensions()
        .get::<AuthCtx>()
        .map(AuthCtx::role)
        .unwrap_or(RoleResolution::Unauthenticated);

    match guard(area, resolution) {
        GuardDecision::Allow => next.run(req).await,
        GuardDecision::Redirect(destination) => {
            tracing::debug!(
                ?area,
                ?resolution,
                to = destination.path(),
                "protected area redirect"
            );
            Redirect::to(destination.path()).into_response()
        }
    }
}
