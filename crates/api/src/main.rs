use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use luthier_api::background;
use luthier_api::cache::{KeyValueCache, RedisCache};
use luthier_api::config::ServerConfig;
use luthier_api::oauth::google::GoogleOAuth;
use luthier_api::router::build_app_router;
use luthier_api::services::AuthService;
use luthier_api::state::AppState;
use luthier_api::store::{AuthStore, PgAuthStore};
use luthier_events::{EmailDispatcher, EmailQueue, JobQueue, RedisJobQueue};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid configuration")?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = luthier_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    luthier_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    luthier_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Redis: cache and email queue ---
    let redis = redis::Client::open(config.redis_url.as_str()).context("Invalid REDIS_URL")?;
    let cache: Arc<dyn KeyValueCache> = Arc::new(
        RedisCache::connect(redis.clone())
            .await
            .context("Failed to connect to Redis")?,
    );
    let job_queue: Arc<dyn JobQueue> = Arc::new(
        RedisJobQueue::connect(redis, config.email_queue_name.clone())
            .await
            .context("Failed to connect the email queue")?,
    );
    tracing::info!(queue = %config.email_queue_name, "Redis connections established");

    // --- Collaborators ---
    let store: Arc<dyn AuthStore> = Arc::new(PgAuthStore::new(pool));
    let oauth =
        Arc::new(GoogleOAuth::new(&config.google).context("Invalid Google OAuth settings")?);
    let transport = config
        .email
        .clone()
        .build()
        .context("Failed to build email transport")?;

    let auth = Arc::new(AuthService::new(
        Arc::clone(&store),
        cache,
        EmailQueue::new(Arc::clone(&job_queue)),
        oauth,
        config.jwt.clone(),
    ));

    // --- Background tasks ---
    let cancel = CancellationToken::new();

    let dispatcher = EmailDispatcher::new(job_queue, transport);
    let dispatcher_handle = tokio::spawn(dispatcher.run(cancel.clone()));

    let cleanup_handle = tokio::spawn(background::session_cleanup::run(
        Arc::clone(&store),
        Duration::from_secs(config.session_cleanup_interval_secs),
        cancel.clone(),
    ));
    tracing::info!("Background tasks started (email dispatcher, session cleanup)");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        auth,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host: std::net::IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address: {}", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, dispatcher_handle).await.is_err() {
        tracing::warn!("Email dispatcher did not stop in time");
    }
    if tokio::time::timeout(grace, cleanup_handle).await.is_err() {
        tracing::warn!("Session cleanup job did not stop in time");
    }
    tracing::info!("Background tasks stopped");

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` controls filtering; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "luthier_api=debug,luthier_events=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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
