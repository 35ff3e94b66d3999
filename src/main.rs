//! Survey bot
//!
//! Runs a fixed multiple-choice questionnaire over a chat channel with every
//! respondent on the roster and records each final answer in a shared
//! response grid.

mod api;
mod config;
mod grid;
mod prompt;
mod runtime;
mod state_machine;
mod survey;
mod transport;
mod validator;

use api::{create_router, AppState};
use config::SurveyConfig;
use grid::{Grid, SqliteGridBackend};
use runtime::{RuntimeManager, Transport};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::{LogTransport, WebhookTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "survey_bot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = SurveyConfig::from_env()?;

    let roster = survey::load_roster(&config.roster_path)?;
    let catalog = survey::load_catalog(&config.catalog_path)?;
    tracing::info!(
        respondents = roster.len(),
        questions = catalog.len(),
        "Survey loaded"
    );

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Open the response grid
    tracing::info!(path = %config.db_path.display(), "Opening response grid");
    let backend = SqliteGridBackend::open(&config.db_path)?;
    let grid = Grid::open(backend, &roster)?;

    let transport: Arc<dyn Transport> = match &config.outbound_url {
        Some(url) => {
            tracing::info!(url = %url, "Delivering outbound messages via webhook");
            Arc::new(WebhookTransport::new(url.clone(), config.outbound_token.clone())?)
        }
        None => {
            tracing::warn!("SURVEY_OUTBOUND_URL not set; outbound messages are only logged");
            Arc::new(LogTransport)
        }
    };

    // Recover respondents and start their runtimes
    let runtime = RuntimeManager::start(roster, catalog, grid, transport).await;
    let state = AppState::new(runtime);

    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Survey bot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
