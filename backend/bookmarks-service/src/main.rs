use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use bookmarks_service::config::Config;
use bookmarks_service::handlers::{self, AppState, Stores};
use bookmarks_service::repository::{PgActionStore, PgFollowStore, PgImageStore, PgUserStore};
use bookmarks_service::services::{RedisCounterStore, SystemClock};
use bookmarks_service::workers::redis_health;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.app.log_level.as_str()));

    if config.app.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config);

    info!(
        env = %config.app.env,
        http_port = config.app.http_port,
        "Starting bookmarks-service"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::query("SELECT 1")
        .execute(&pg_pool)
        .await
        .context("Failed to verify database connection")?;
    info!("Database pool created and verified");

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let redis_client =
        redis::Client::open(config.redis.url.as_str()).context("Failed to create Redis client")?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client)
        .await
        .context("Failed to connect to Redis")?;
    info!("Redis connection established");

    let counters = Arc::new(RedisCounterStore::new(
        redis_conn,
        config.redis.key_prefix.clone(),
    ));
    let stores = Stores {
        actions: Arc::new(PgActionStore::new(pg_pool.clone())),
        follows: Arc::new(PgFollowStore::new(pg_pool.clone())),
        images: Arc::new(PgImageStore::new(pg_pool.clone())),
        users: Arc::new(PgUserStore::new(pg_pool.clone())),
        counters: counters.clone(),
    };
    let state = AppState::new(
        stores,
        Arc::new(SystemClock),
        &config.activity,
        &config.ranking,
    );

    let health_task = tokio::spawn(redis_health::start_redis_health_check(
        counters,
        redis_health::RedisHealthConfig::default(),
    ));

    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);
    info!(addr = %http_addr, "HTTP server listening");

    let state = web::Data::new(state);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&http_addr)
    .context("Failed to bind HTTP server")?
    .disable_signals()
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        handle.stop(true).await;
    });

    let result = server.await.context("HTTP server error");

    health_task.abort();
    pg_pool.close().await;
    info!("bookmarks-service shut down");

    result
}
