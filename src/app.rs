/*
 * Responsibility
 * - Load Config -> build collaborators -> assemble the Router
 * - Apply transport middleware (HTTP, CORS, security headers)
 * - Serve with axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    repos::{audit_repo::PgDownloadAuditLog, purchase_repo::PgPurchaseRepo},
    services::{
        download::DownloadAuthorizer, identity::JwtIdentityProvider, storage::StorageUrlSigner,
    },
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,gospel_access=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics through tracing; stderr may not be collected.
        tracing::error!(?info, "panic");

        // Development: crash the whole process so it gets noticed.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting access service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    // Lazy: the pool connects on first use, so a database blip does not stop startup.
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect_lazy(&config.database_url)
        .context("invalid DATABASE_URL")?;

    let identity = JwtIdentityProvider::new(
        &config.token_key,
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
        config.session_cookie_name.clone(),
    )
    .map_err(anyhow::Error::msg)?;

    let signer = StorageUrlSigner::new(
        &config.storage_base_url,
        &config.storage_bucket,
        &config.storage_signing_secret,
    )?;

    let downloads = DownloadAuthorizer::new(
        Arc::new(PgPurchaseRepo::new(pool.clone())),
        Arc::new(signer),
        Arc::new(PgDownloadAuditLog::new(pool)),
    );

    Ok(AppState::new(
        Arc::new(identity),
        Arc::new(downloads),
        config.download_denial,
    ))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::router(state);
    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
