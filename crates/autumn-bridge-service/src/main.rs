//! Autumn Bridge Service - billing endpoints backed by the Autumn API
//!
//! This is the main entry point for the autumn-bridge service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autumn_bridge_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,autumn_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Autumn Bridge Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        autumn_base_url = %config.autumn_base_url,
        secret_key_configured = %config.autumn_secret_key.is_some(),
        sessions_enabled = %config.session_jwt_secret.is_some(),
        organizations_enabled = %config.enable_organizations,
        "Service configuration loaded"
    );

    let plugin = config.plugin_config()?;

    // Build app state
    let state = AppState::new(plugin, config.clone())?;
    if !state.has_secret_key() {
        tracing::warn!(
            "No Autumn secret key configured - falling back to AUTUMN_SECRET_KEY per request"
        );
    }

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all billing endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
