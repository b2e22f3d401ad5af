use std::str::FromStr;

use axum::http::StatusCode;
use thiserror::Error;

/// Why a download was not granted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DownloadError {
    #[error("no authenticated principal")]
    Unauthorized,
    #[error("principal has no orders")]
    NoPurchases,
    #[error("no paid order contains the requested artifact")]
    AccessDenied,
    #[error("storage failed to sign the download url")]
    SigningFailed,
    #[error("upstream lookup failed")]
    Upstream,
}

/// How much a 403 reveals about the caller's purchase history.
///
/// `Distinct` keeps separate messages for "no orders at all" and "orders, but not this
/// item". `Uniform` answers both with the same message. The status is 403 either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DenialDisclosure {
    #[default]
    Distinct,
    Uniform,
}

impl FromStr for DenialDisclosure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distinct" => Ok(Self::Distinct),
            "uniform" => Ok(Self::Uniform),
            other => Err(format!("unknown denial disclosure policy: {other}")),
        }
    }
}

const ACCESS_DENIED_MESSAGE: &str = "Access denied. You have not purchased this item.";

impl DownloadError {
    pub fn status(&self) -> StatusCode {
        match self {
            DownloadError::Unauthorized => StatusCode::UNAUTHORIZED,
            DownloadError::NoPurchases | DownloadError::AccessDenied => StatusCode::FORBIDDEN,
            DownloadError::SigningFailed | DownloadError::Upstream => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Never includes upstream detail.
    pub fn public_message(&self, disclosure: DenialDisclosure) -> &'static str {
        match (self, disclosure) {
            (DownloadError::Unauthorized, _) => "Unauthorized",
            (DownloadError::NoPurchases, DenialDisclosure::Distinct) => "No purchases found",
            (DownloadError::NoPurchases, DenialDisclosure::Uniform) => ACCESS_DENIED_MESSAGE,
            (DownloadError::AccessDenied, _) => ACCESS_DENIED_MESSAGE,
            (DownloadError::SigningFailed, _) => "Failed to generate download link",
            (DownloadError::Upstream, _) => "Internal server error",
        }
    }
}
