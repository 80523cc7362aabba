// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::page_service::PageService;
use crate::infrastructure::config::{load_pages_config, load_server_config};
use crate::infrastructure::source_fetcher::{DataRoot, SourceFetcher};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, list_pages, render_page};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let server_config = load_server_config()?;
    let catalog = load_pages_config()?.build_catalog()?;

    // Create fetcher (infrastructure layer)
    let fetcher = Arc::new(SourceFetcher::new(DataRoot::parse(&server_config.data.root)));

    // Create services (application layer)
    let page_service = PageService::new(fetcher, catalog);
    for page in page_service.list_pages() {
        tracing::info!("Page {} declares {} panels", page.name, page.panels);
    }

    let state = Arc::new(AppState { page_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/pages", get(list_pages))
        .route("/pages/:name", get(render_page))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = server_config.server.bind.parse()?;
    tracing::info!("Starting jobs-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
