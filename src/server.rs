//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, cache setup, the calendar source and the Axum
//! server lifecycle.

use crate::application::services::{CatalogService, ShortenService};
use crate::config::Config;
use crate::domain::calendar::MergeHeader;
use crate::domain::repositories::{CompositeLinkRepository, SimpleLinkRepository};
use crate::domain::validation::RequestValidator;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::calendar_source::{Catalog, HttpCalendarSource};
use crate::infrastructure::persistence::{
    MemoryCompositeLinkRepository, MemorySimpleLinkRepository, PgCompositeLinkRepository,
    PgSimpleLinkRepository,
};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::ShortCodeGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

type Stores = (
    Arc<dyn SimpleLinkRepository>,
    Arc<dyn CompositeLinkRepository>,
);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations, or the in-memory store
/// - Redis feed cache (or NullCache fallback)
/// - Course catalog and HTTP calendar source
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (simple_links, composite_links) = open_stores(&config).await?;

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let catalog = match Catalog::load(&config.catalog_path) {
        Ok(catalog) => {
            tracing::info!(path = %config.catalog_path, "Course catalog loaded");
            Some(catalog)
        }
        Err(e) => {
            tracing::warn!(
                path = %config.catalog_path,
                "Course catalog unavailable: {}. Catalog endpoints will fail.",
                e
            );
            None
        }
    };

    let source = Arc::new(
        HttpCalendarSource::new(
            config.subject_feed_template.clone(),
            Duration::from_secs(config.source_timeout_seconds),
            cache.clone(),
            catalog,
        )
        .context("Failed to build HTTP client")?
        .with_max_feed_bytes(config.max_feed_bytes),
    );

    let validator = RequestValidator::new(&config.calendar_url_pattern)
        .context("Invalid CALENDAR_URL_PATTERN")?;

    let shorten_service = Arc::new(ShortenService::new(
        simple_links,
        composite_links,
        source.clone(),
        validator.clone(),
        ShortCodeGenerator::new(config.short_code_length),
        MergeHeader::new(config.calendar_name.clone()),
    ));
    let catalog_service = Arc::new(CatalogService::new(source, validator));

    let state = AppState {
        shorten_service,
        catalog_service,
        cache,
        public_base_url: config.public_base_url.clone(),
    };

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Connects to PostgreSQL and applies migrations, or falls back to the
/// in-memory store when no database is configured.
async fn open_stores(config: &Config) -> Result<Stores> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("No database configured, links are kept in memory and lost on restart");
        return Ok((
            Arc::new(MemorySimpleLinkRepository::new()),
            Arc::new(MemoryCompositeLinkRepository::new()),
        ));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let pool = Arc::new(pool);
    Ok((
        Arc::new(PgSimpleLinkRepository::new(pool.clone())),
        Arc::new(PgCompositeLinkRepository::new(pool)),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
