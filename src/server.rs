//! HTTP server initialization and runtime setup.
//!
//! Handles the database connection, code pool warm-up, background workers
//! and the Axum server lifecycle.

use crate::application::services::{AccessRecorder, LayeredResolver, run_access_worker};
use crate::config::Config;
use crate::domain::repositories::MappingRepository;
use crate::infrastructure::cache::LruCache;
use crate::infrastructure::persistence::PgMappingRepository;
use crate::pool::{CodePool, CursorStore, FileBatchLoader};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Code pool, with the first batch loaded before serving
/// - Background access worker and pool status reporter
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migrations fail
/// - The pool or cursor file cannot be read
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Failed to run migrations")?;

    let code_spec = config.code_spec()?;
    let loader = FileBatchLoader::new(
        &config.pool_file,
        CursorStore::new(&config.cursor_file),
        code_spec.length(),
    );
    let pool = CodePool::new(
        Arc::new(loader),
        config.pool_threshold,
        config.pool_batch_size,
    );
    let loaded = pool
        .init()
        .await
        .with_context(|| format!("Failed to load codes from {}", config.pool_file.display()))?;
    if loaded == 0 {
        warn!(
            pool_file = %config.pool_file.display(),
            "pool file has no unclaimed codes, run generate-pool"
        );
    }

    let repository: Arc<dyn MappingRepository> = Arc::new(PgMappingRepository::new(Arc::new(db)));
    let cache = Arc::new(LruCache::new(config.cache_capacity));
    let link_ttl = chrono::Duration::try_days(config.link_ttl_days)
        .context("LINK_TTL_DAYS is out of range")?;
    let resolver = Arc::new(LayeredResolver::new(repository, cache, link_ttl));

    let (access_tx, access_rx) = mpsc::channel(config.access_queue_capacity);
    let access_worker = tokio::spawn(run_access_worker(access_rx, resolver.clone()));

    if config.pool_status_interval_secs > 0 {
        tokio::spawn(report_pool_status(
            pool.clone(),
            Duration::from_secs(config.pool_status_interval_secs),
        ));
    }

    let state = AppState::new(
        pool,
        resolver,
        AccessRecorder::new(access_tx),
        code_spec,
        config.base_url.clone(),
    );

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router held the last sender; the worker drains what is queued and exits.
    if let Err(e) = access_worker.await {
        warn!(error = %e, "access worker did not shut down cleanly");
    }
    info!("Server stopped");

    Ok(())
}

/// Logs the pool level every `period`.
async fn report_pool_status(pool: CodePool, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        info!(
            available = pool.count(),
            loading = pool.is_loading(),
            "code pool status"
        );
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
