use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use steamwatch_api::config::AppConfig;
use steamwatch_api::router::build_app_router;
use steamwatch_api::state::AppState;
use steamwatch_audit::{AuditLayer, AuditWriter, ChannelSink};
use steamwatch_core::snowflake::Snowflake;
use steamwatch_steam::SteamClient;
use steamwatch_worker::{PlayerTracker, TickScheduler};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // --- Tracing ---
    let (audit_sink, audit_rx) = ChannelSink::channel();
    let audit_sink = Arc::new(audit_sink);
    let level = &config.log_level;
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("steamwatch={level},tower_http={level}").into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(console_filter))
        .with(AuditLayer::new(Arc::clone(&audit_sink)).with_filter(steamwatch_audit::targets()))
        .init();

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        steam_id = %config.tracker.steam_id,
        task_disabled = config.tracker.disabled,
        "Loaded configuration"
    );

    let ids = Arc::new(
        Snowflake::new(config.snowflake_node_id).expect("SNOWFLAKE_NODE_ID is range-checked by config"),
    );

    // --- Database ---
    let pool = steamwatch_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    steamwatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    if config.reset_database {
        steamwatch_db::reset_database(&pool)
            .await
            .expect("Failed to reset database");
        tracing::info!("Database reset");
    } else {
        steamwatch_db::run_migrations(&pool)
            .await
            .expect("Failed to run database migrations");
        tracing::info!("Database migrations applied");
    }

    // --- Audit writer ---
    let audit_handle = tokio::spawn(AuditWriter::run(pool.clone(), Arc::clone(&ids), audit_rx));

    // --- Polling ---
    let cancel = CancellationToken::new();
    let scheduler_handle = if config.tracker.disabled {
        tracing::info!("Polling task disabled");
        None
    } else {
        let client = SteamClient::new(
            config.tracker.steam_api_key.clone(),
            config.tracker.retry_policy(),
        )
        .expect("Failed to build Steam HTTP client");
        let tracker = Arc::new(PlayerTracker::new(
            pool.clone(),
            Arc::clone(&ids),
            client,
            config.tracker.steam_id,
            cancel.clone(),
        ));
        let scheduler = TickScheduler::new(config.tracker.interval(), cancel.clone());
        Some(tokio::spawn(async move {
            scheduler
                .run(move || {
                    let tracker = Arc::clone(&tracker);
                    async move { tracker.run_tick().await }
                })
                .await;
        }))
    };

    // --- HTTP ---
    let state = AppState { pool };
    let app = build_app_router(state, &config.server);

    let addr = SocketAddr::new(
        config.server.host.parse().expect("HOST is validated by config"),
        config.server.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Starting server");

    let server_cancel = cancel.clone();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .into_future(),
    );

    tokio::select! {
        () = shutdown_signal() => {}
        result = &mut server => {
            tracing::error!(?result, "Server exited unexpectedly");
        }
    }

    // --- Shutdown ---
    cancel.cancel();
    let drain = config.server.shutdown_timeout();

    if !server.is_finished() {
        match tokio::time::timeout(drain, &mut server).await {
            Ok(Ok(Ok(()))) => tracing::info!("HTTP listener drained"),
            Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server error during shutdown"),
            Ok(Err(e)) => tracing::error!(error = %e, "Server task failed"),
            Err(_) => {
                tracing::warn!(timeout_secs = drain.as_secs(), "HTTP drain timed out");
                server.abort();
            }
        }
    }

    if let Some(handle) = scheduler_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Scheduler task failed");
        }
    }

    tracing::info!("Graceful shutdown complete, flushing audit log");
    audit_sink.close();
    if tokio::time::timeout(drain, audit_handle).await.is_err() {
        tracing::warn!(timeout_secs = drain.as_secs(), "Audit writer did not finish in time");
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
