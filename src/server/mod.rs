//! HTTP exposure of the booking engine

pub mod handlers;
pub mod router;

pub use handlers::AppState;
pub use router::build_router;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

/// Serve the application with graceful shutdown
///
/// Binds to the provided address, serves requests, and handles SIGTERM and
/// SIGINT (Ctrl+C) for graceful shutdown.
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(engine);
/// serve("127.0.0.1:3000", build_router(state)).await?;
/// ```
pub async fn serve(addr: &str, app: Router) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
