use tracing::info;
use tracing_subscriber::EnvFilter;

use wallet_tracker_backend::{create_router, initialize_backend, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let port = config.port;
    info!("Setting up database at {}", config.database_url);
    let state = initialize_backend(config).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Wallet tracker backend listening on port {port}");
    axum::serve(listener, app).await?;
    Ok(())
}
