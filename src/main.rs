use receiptlens::config::Config;
use receiptlens::server::build_app;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "receiptlens=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let address = config.address();
    tracing::info!("Starting ReceiptLens {} on {}", receiptlens::VERSION, address);

    let (_state, app) = build_app(config).expect("Failed to build application");

    let listener = TcpListener::bind(&address)
        .await
        .expect("Failed to bind address");

    tracing::info!("Listening on http://{}", address);

    axum::serve(listener, app).await.expect("Server error");
}
