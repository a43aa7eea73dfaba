// Server binary entry point
//
// Usage: cargo run --bin server

use medicost::{create_router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Default log level: info for our crate, warn for others
                "medicost=info,tower_http=debug,axum=debug,warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting medical cost predictor...");

    // Configuration from environment variables, defaulting to the fixed
    // relative paths the app ships with
    let model_path: PathBuf = std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| "model/charges_model.json".to_string())
        .into();

    let dataset_path: PathBuf = std::env::var("DATASET_PATH")
        .unwrap_or_else(|_| "data/insurance.csv".to_string())
        .into();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    tracing::info!("Configuration:");
    tracing::info!("  MODEL_PATH: {}", model_path.display());
    tracing::info!("  DATASET_PATH: {}", dataset_path.display());
    tracing::info!("  PORT: {}", port);

    // Model loads once here; a failure disables prediction but the rest of
    // the UI still serves
    let state = AppState::new(&model_path, &dataset_path);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
