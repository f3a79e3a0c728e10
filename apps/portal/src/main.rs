mod backend;
mod config;
mod errors;
mod flows;
mod gateway;
mod models;
mod navigation;
mod normalize;
mod pages;
mod routes;
mod session;
mod state;
mod views;

use std::net::SocketAddr;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::gateway::ApiGateway;
use crate::routes::build_router;
use crate::state::{spawn_session_sweeper, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (malformed numbers abort startup)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting placement portal v{}", env!("CARGO_PKG_VERSION"));

    // Initialize backend gateway
    let gateway = ApiGateway::new(&config)?;
    info!(
        "Backend gateway initialized (api: {}, admin: {})",
        config.api_base_url, config.admin_api_base_url
    );

    // Register a view per page
    let controller = views::controller();
    for page in pages::all() {
        if !controller.has_handler(page.key) {
            warn!("No view registered for page '{}'", page.key);
        }
    }

    // Build app state
    let state = AppState::new(config.clone(), gateway, controller);

    // Drop idle browser sessions in the background
    spawn_session_sweeper(
        state.sessions.clone(),
        config.session_sweep_interval,
        config.session_ttl,
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
