//! GoutTogether Server — group-travel booking backend.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{fmt, EnvFilter};

use gout_core::config::AppConfig;
use gout_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("GOUT_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting GoutTogether v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db_pool = gout_database::connection::create_pool(&config.database).await?;

    tracing::info!("Running database migrations...");
    gout_database::migration::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Initialize auth components ───────────────────────
    let token_issuer = Arc::new(gout_auth::jwt::TokenIssuer::new(&config.auth));
    let token_verifier = Arc::new(gout_auth::jwt::TokenVerifier::new(&config.auth));
    let password_hasher = Arc::new(gout_auth::password::PasswordHasher::new());
    let credential_codec = gout_auth::credential::CredentialCodec::new(&config.auth);

    // ── Step 3: Initialize store and repositories ────────────────
    let store: Arc<dyn gout_database::store::BookingStore> =
        Arc::new(gout_database::store::PgBookingStore::new(db_pool.clone()));
    let members = Arc::new(gout_database::repositories::member::MemberRepository::new(
        db_pool.clone(),
    ));

    // ── Step 4: Initialize services ──────────────────────────────
    let bookings = gout_service::BookingService::new(
        Arc::clone(&store),
        credential_codec.clone(),
        config.booking.clone(),
    );
    let checkin = gout_service::CheckInService::new(
        Arc::clone(&store),
        credential_codec,
        config.booking.clone(),
    );
    let orchestrator = Arc::new(gout_worker::JobOrchestrator::new(
        Arc::clone(&store),
        bookings.clone(),
        config.worker.clone(),
    ));
    tracing::info!("Services initialized");

    // ── Step 5: Start the job scheduler ──────────────────────────
    let mut scheduler = if config.worker.enabled {
        let scheduler = gout_worker::WorkerScheduler::new(
            Arc::clone(&orchestrator),
            config.worker.clone(),
        )
        .await?;
        scheduler.register_sweep().await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background sweep disabled");
        None
    };

    // ── Step 6: Build and start HTTP server ──────────────────────
    let app_state = gout_api::state::AppState {
        config: Arc::new(config.clone()),
        store,
        bookings,
        checkin,
        orchestrator,
        token_issuer,
        token_verifier,
        password_hasher,
        members,
    };

    let app = gout_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("GoutTogether server listening on {addr}");

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 7: Stop background tasks ────────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }

    tracing::info!("GoutTogether server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
