/*
 * Responsibility
 * - Load settings from the environment (DATABASE_URL, auth, storage, CORS ...)
 * - Validate them up front (missing values fail startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::download::DenialDisclosure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Key material used to verify session tokens issued by the hosted auth provider.
#[derive(Clone)]
pub enum TokenKey {
    /// Shared HS256 secret (the provider's JWT secret).
    Secret(String),
    /// Ed25519 public key, PEM encoded.
    EdPublicPem(String),
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            TokenKey::Secret(_) => f.write_str("TokenKey::Secret(..)"),
            TokenKey::EdPublicPem(_) => f.write_str("TokenKey::EdPublicPem(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,

    pub cors_allowed_origins: Vec<String>,
    pub http_timeout_seconds: u64,
    pub http_body_limit_bytes: usize,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub access_token_leeway_seconds: u64,
    pub token_key: TokenKey,
    pub session_cookie_name: String,

    pub storage_base_url: String,
    pub storage_bucket: String,
    pub storage_signing_secret: String,

    pub download_denial: DenialDisclosure,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let cors_allowed_origins = split_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
        );

        let http_timeout_seconds = std::env::var("HTTP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let http_body_limit_bytes = std::env::var("HTTP_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let auth_issuer =
            std::env::var("AUTH_ISSUER").map_err(|_| ConfigError::Missing("AUTH_ISSUER"))?;

        let auth_audience =
            std::env::var("AUTH_AUDIENCE").map_err(|_| ConfigError::Missing("AUTH_AUDIENCE"))?;

        let access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        // Prefer the asymmetric key when both are configured.
        let token_key = match (
            std::env::var("ACCESS_JWT_PUBLIC_KEY_PEM").ok(),
            std::env::var("AUTH_JWT_SECRET").ok(),
        ) {
            (Some(pem), _) if !pem.trim().is_empty() => {
                TokenKey::EdPublicPem(pem.replace("\\n", "\n"))
            }
            (_, Some(secret)) if !secret.trim().is_empty() => TokenKey::Secret(secret),
            _ => return Err(ConfigError::Missing("AUTH_JWT_SECRET")),
        };

        let session_cookie_name = std::env::var("SESSION_COOKIE_NAME")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "sb-access-token".to_string());

        let storage_base_url = std::env::var("STORAGE_BASE_URL")
            .map_err(|_| ConfigError::Missing("STORAGE_BASE_URL"))?;
        url::Url::parse(&storage_base_url).map_err(|_| ConfigError::Invalid("STORAGE_BASE_URL"))?;

        let storage_bucket = std::env::var("STORAGE_BUCKET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "downloads".to_string());

        let storage_signing_secret = std::env::var("STORAGE_SIGNING_SECRET")
            .map_err(|_| ConfigError::Missing("STORAGE_SIGNING_SECRET"))?;

        let download_denial = match std::env::var("DOWNLOAD_DENIAL_MESSAGES") {
            Ok(raw) => DenialDisclosure::from_str(&raw)
                .map_err(|_| ConfigError::Invalid("DOWNLOAD_DENIAL_MESSAGES"))?,
            Err(_) => DenialDisclosure::default(),
        };

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            cors_allowed_origins,
            http_timeout_seconds,
            http_body_limit_bytes,
            auth_issuer,
            auth_audience,
            access_token_leeway_seconds,
            token_key,
            session_cookie_name,
            storage_base_url,
            storage_bucket,
            storage_signing_secret,
            download_denial,
        })
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
