use axum::Router;
use runroute::config::Config;
use runroute::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runroute=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting RunRoute API server");
    tracing::info!(
        osrm = %config.osrm_base_url,
        profile = %config.osrm_profile,
        overpass = %config.overpass_api_url,
        elevation = %config.elevation_api_url,
        "Configuration loaded successfully"
    );
    if let Some(seed) = config.seed {
        tracing::warn!(seed, "Using fixed RNG seed {}, every request searches identically", seed);
    }

    let state = Arc::new(AppState::from_config(&config));

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", runroute::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
