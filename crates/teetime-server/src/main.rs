mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use teetime_scraper::{
    BreakerConfig, CallBudget, CircuitBreaker, GolfpangClient, ResilientSource, RetryPolicy,
    TeescannerClient,
};
use teetime_store::CacheStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState, RefreshTrigger},
    scheduler::{RefreshScheduler, SchedulerSettings},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = teetime_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let clubs = Arc::new(teetime_core::load_clubs(&config.clubs_path)?);

    let store = CacheStore::new(Duration::from_millis(config.cache_lock_timeout_ms));
    if let Some(path) = &config.snapshot_path {
        store.restore_or_start_empty(path).await;
    }

    let teescanner = TeescannerClient::new(
        &config.teescanner_base_url,
        config.teescanner_timeout_secs,
        &config.user_agent,
    )?;
    let golfpang = GolfpangClient::new(
        &config.golfpang_base_url,
        CallBudget {
            connect: Duration::from_secs(config.connect_timeout_secs),
            read: Duration::from_secs(config.read_timeout_secs),
        },
        RetryPolicy::new(
            config.max_retries,
            Duration::from_millis(config.retry_backoff_base_ms),
        ),
        &config.user_agent,
        config.golfpang_accept_invalid_certs,
    )?
    .with_favorites(config.crawl_favorites.clone());

    let breaker = Arc::new(CircuitBreaker::new(BreakerConfig {
        failure_threshold: config.breaker_threshold,
        cool_down: Duration::from_secs(config.breaker_cooldown_secs),
    }));

    let scheduler = Arc::new(RefreshScheduler::new(
        teescanner,
        ResilientSource::new(golfpang, Arc::clone(&breaker)),
        Arc::clone(&clubs),
        store.clone(),
        SchedulerSettings::from_app_config(&config),
    ));
    tokio::spawn(Arc::clone(&scheduler).run_forever());

    let trigger_target = Arc::clone(&scheduler);
    let app = build_app(AppState {
        store: store.clone(),
        clubs,
        refresh: RefreshTrigger::new(move || trigger_target.trigger()),
        source_b_breaker: breaker,
        max_query_days: config.max_query_days,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "tee-time server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(path) = &config.snapshot_path {
        match store.save_snapshot(path).await {
            Ok(dates) => {
                tracing::info!(dates, path = %path.display(), "cache snapshot saved on shutdown");
            }
            Err(e) => tracing::warn!(error = %e, "cache snapshot not saved on shutdown"),
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
