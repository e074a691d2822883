//! Dokan Storefront - Bangladesh e-commerce storefront.
//!
//! Serves the cart API on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework; JSON responses with HTMX triggers
//! - Hosted backend (PostgREST-style REST) for products, coupons and
//!   signed-in carts
//! - Server-side sessions for guest carts, `PostgreSQL`-backed when a
//!   database URL is configured

#![cfg_attr(not(test), forbid(unsafe_code))]

use dokan_storefront::config::StorefrontConfig;
use dokan_storefront::state::AppState;
use dokan_storefront::{build_router, db};
use sentry::integrations::tracing as sentry_tracing;
use sqlx::PgPool;
use tower_sessions::MemoryStore;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install Sentry (when a DSN is configured) and the tracing subscriber.
///
/// The returned guard flushes Sentry on drop and must outlive the server.
fn init_telemetry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: config.sentry_environment.clone().map(Into::into),
                sample_rate: config.sentry_sample_rate,
                traces_sample_rate: config.sentry_traces_sample_rate,
                attach_stacktrace: true,
                ..Default::default()
            },
        ))
    });

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dokan_storefront=info,tower_http=debug".into());

    // Soft cart failures are warnings, so they reach Sentry as events
    let sentry_layer = sentry_tracing::layer().event_filter(|metadata| match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .init();

    if guard.is_some() {
        tracing::info!("Sentry initialized");
    }
    guard
}

/// Connect the session database, if one is configured.
async fn connect_sessions(config: &StorefrontConfig) -> Option<PgPool> {
    let Some(url) = &config.database_url else {
        tracing::warn!("No database configured, sessions are kept in memory");
        return None;
    };

    // The session table is created by `dokan migrate sessions`, not here
    let pool = db::create_pool(url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Session database pool created");
    Some(pool)
}

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");
    let _sentry_guard = init_telemetry(&config);

    let pool = connect_sessions(&config).await;
    let state =
        AppState::new(config.clone(), pool.clone()).expect("Failed to initialize application state");

    let app = match pool {
        Some(pool) => build_router(state, PostgresStore::new(pool)),
        None => build_router(state, MemoryStore::default()),
    }
    .layer(sentry_tower::NewSentryLayer::new_from_top())
    .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, backend = %config.backend.url, "Storefront listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
