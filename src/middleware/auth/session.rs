//! Session resolution: ask the identity provider who is calling and put the
//! result (`AuthCtx`) into request extensions.
//!
//! This layer never rejects for a missing or invalid session. Deciding what an
//! anonymous caller may do is left to the route guard and the handlers. Only a
//! failing identity provider ends the request here (generic 500).

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8's from_fn cannot take a State extractor, so pass it with from_fn_with_state
    router.layer(middleware::from_fn_with_state(state, session_middleware))
}

async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal = state.identity.current_principal(req.headers()).await?;

    req.extensions_mut().insert(AuthCtx::new(principal));

    Ok(next.run(req).await)
}
