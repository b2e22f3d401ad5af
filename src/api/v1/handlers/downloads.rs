/*
 * Responsibility
 * - GET /api/v1/downloads/{*path}
 * - Hand the caller's principal and the requested storage path to the authorizer
 * - Shape the JSON contract: { success, downloadUrl, expiresIn, fileName } or { success, error }
 */
use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    api::v1::extractors::AuthCtxExtractor,
    services::download::{DenialDisclosure, DownloadError, DownloadGrant},
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub success: bool,
    pub download_url: String,
    pub expires_in: u64,
    pub file_name: String,
}

impl From<DownloadGrant> for DownloadResponse {
    fn from(grant: DownloadGrant) -> Self {
        Self {
            success: true,
            download_url: grant.download_url,
            expires_in: grant.expires_in,
            file_name: grant.file_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DownloadFailureBody {
    pub success: bool,
    pub error: &'static str,
}

fn failure(err: DownloadError, disclosure: DenialDisclosure) -> Response {
    let body = DownloadFailureBody {
        success: false,
        error: err.public_message(disclosure),
    };
    (err.status(), Json(body)).into_response()
}

pub async fn download(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    // An undecodable path can't name any product, but the caller still gets 401 first.
    let path = match path {
        Ok(Path(path)) => path,
        Err(rejection) => {
            let err = if ctx.principal.is_none() {
                DownloadError::Unauthorized
            } else {
                tracing::info!(error = %rejection, "download denied: malformed path");
                DownloadError::AccessDenied
            };
            return failure(err, state.download_denial);
        }
    };

    match state
        .downloads
        .authorize_download(ctx.principal.as_ref(), &path)
        .await
    {
        Ok(grant) => (StatusCode::OK, Json(DownloadResponse::from(grant))).into_response(),
        Err(err) => failure(err, state.download_denial),
    }
}
