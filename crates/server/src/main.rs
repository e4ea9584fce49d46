//! Cinewix server entry point.

use std::sync::Arc;

use axum::{middleware, Router};
use cinewix_api::{middleware::AppState, router as api_router};
use cinewix_common::Config;
use cinewix_core::{AdminService, AuthService, BookingService, EmailService, MovieService, UserService};
use cinewix_db::repositories::{
    BookingRepository, MovieRepository, ReviewRepository, TransactionRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
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
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinewix=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting cinewix server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = cinewix_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    cinewix_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let movie_repo = MovieRepository::new(Arc::clone(&db));
    let review_repo = ReviewRepository::new(Arc::clone(&db));
    let booking_repo = BookingRepository::new(Arc::clone(&db));
    let transaction_repo = TransactionRepository::new(Arc::clone(&db));

    // Initialize services
    let email_service = EmailService::new(&config);
    if email_service.is_enabled() {
        info!("Email delivery configured");
    } else {
        info!("Email delivery disabled, codes will be logged instead");
    }

    let auth_service = AuthService::new(user_repo.clone(), email_service.clone(), &config);
    let user_service = UserService::new(user_repo.clone(), &config);
    let movie_service = MovieService::new(movie_repo.clone(), review_repo);
    let booking_service = BookingService::new(
        booking_repo.clone(),
        movie_repo.clone(),
        transaction_repo.clone(),
        email_service,
        &config,
    );
    let admin_service = AdminService::new(user_repo, movie_repo, booking_repo, transaction_repo);

    // Create app state
    let state = AppState {
        auth_service,
        user_service,
        movie_service,
        booking_service,
        admin_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .nest_service(
            &config.uploads.base_url,
            ServeDir::new(&config.uploads.base_path),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            cinewix_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
