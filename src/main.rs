use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use clinicbook::config::AppConfig;
use clinicbook::db;
use clinicbook::handlers;
use clinicbook::services::seed;
use clinicbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into()))
        .init();

    let config = AppConfig::from_env();

    let store = db::open_store(&config)?;

    if config.seed_sample_doctors {
        seed::seed_sample_doctors(store.as_ref())?;
    }

    if config.session_secret.is_empty() {
        tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
    }

    let state = Arc::new(AppState::new(store, config.clone()));
    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
