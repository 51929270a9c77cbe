pub mod app;
pub mod handlers;
pub mod middleware;

pub use app::{create_app, AppState};

use crate::config::{Config, ServerConfig};
use crate::error::{AppError, ServerError};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

/// Run the gateway until Ctrl+C or SIGTERM
pub async fn run_server(config: Config) -> Result<(), AppError> {
    config.validate()?;

    let app_state = AppState::new(&config)?;
    info!("Application state initialized");

    let app = create_app(app_state);

    let listener = bind_listener(&config.server).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::StartupError(format!("listener has no local address: {}", e)))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::StartupError(format!("server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Bind the configured `host:port`, resolving host names such as `localhost`
async fn bind_listener(server: &ServerConfig) -> Result<TcpListener, ServerError> {
    let address = server.bind_address();
    TcpListener::bind(address.as_str())
        .await
        .map_err(|e| ServerError::BindError { address, source: e })
}


/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
