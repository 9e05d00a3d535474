//! munreg server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use munreg_api::{AdminGate, AppState, router as api_router};
use munreg_common::Config;
use munreg_core::{ExportService, Mailer, PaystackService, RegistrationService};
use munreg_db::repositories::{
    PaymentInitializationRepository, PaymentRepository, RegistrationRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "munreg=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting munreg server...");

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Connect to database
    let db = munreg_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    munreg_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let registration_repo = RegistrationRepository::new(Arc::clone(&db));
    let payment_repo = PaymentRepository::new(Arc::clone(&db));
    let initialization_repo = PaymentInitializationRepository::new(Arc::clone(&db));

    // Initialize mailer
    let mailer = Mailer::new(
        config.smtp.as_ref(),
        &config.registration.conference_name,
    )?;
    if mailer.is_enabled() {
        info!("Mail delivery enabled");
    }

    // Initialize services
    let registration_service = RegistrationService::new(
        Arc::clone(&db),
        registration_repo,
        payment_repo,
        initialization_repo,
        mailer,
        config.registration.clone(),
    );
    let paystack_service =
        PaystackService::new(config.paystack.clone(), registration_service.clone());
    let export_service = ExportService::new(registration_service.clone());

    // Create app state
    let state = AppState {
        registration_service,
        paystack_service,
        export_service,
        gate: AdminGate::new(&config.admin),
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
