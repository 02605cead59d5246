use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{error, info, warn};

use recipe_api::{
    app::{create_router, AppState},
    config::Config,
    forwarder::TrelloForwarder,
    images::ImageUrlResolver,
    middleware::init_tracing,
    service::RecipeService,
    store::JsonFileStore,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if config.environment.is_production() && config.public_base_url.contains("localhost") {
        warn!(
            "PUBLIC_BASE_URL points at localhost in production: {}",
            config.public_base_url
        );
    }

    // Load the recipe catalogue; the service cannot run without it
    let store = match JsonFileStore::load(&config.recipes_path).await {
        Ok(store) => {
            info!("Recipe store ready with {} recipes", store.len().await);
            Arc::new(store)
        }
        Err(e) => {
            error!("Failed to load recipes: {:#}", e);
            std::process::exit(1);
        }
    };

    let forwarder = match TrelloForwarder::new(config.trello.clone()) {
        Ok(forwarder) => Arc::new(forwarder),
        Err(e) => {
            error!("Failed to create task board client: {:#}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(
        RecipeService::new(store),
        ImageUrlResolver::new(config.public_base_url.clone()),
        forwarder,
    );

    // Create the Axum router with all endpoints
    let app = create_router(state, &config.images_dir, &config.allowed_origins);

    // Create socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("Server listening on {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Connect info lets the rate limiter key on the caller's address
    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
/// Listens for SIGTERM and SIGINT signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        },
    }
}
