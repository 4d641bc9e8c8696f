use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::state::{AppState, ReceiptSource};

/// Build the application state and Axum router from a [`Config`].
pub fn build_app(config: Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let source = ReceiptSource::from_config(&config)?;
    match &source {
        ReceiptSource::Remote(client) => {
            tracing::info!("Reading receipts from upstream API at {}", client.base_url())
        }
        ReceiptSource::File(path) => {
            tracing::info!("Reading receipts from {}", path.display())
        }
        ReceiptSource::Memory(_) => {}
    }

    let state = AppState::new(config, source);
    let app = router(state.clone(), handlers::routes());
    Ok((state, app))
}

/// Apply the middleware stack to `routes` and attach `state`.
pub fn router(state: AppState, routes: Router<AppState>) -> Router {
    routes
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_port, handle))
}
