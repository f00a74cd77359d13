//! gymbot - conversational fitness tracker
//!
//! A Telegram bot that keeps a weekly exercise plan, walks users through
//! training days with rest timers, and reports progress.

mod api;
mod chart;
mod config;
mod motivation;
mod runtime;
mod state_machine;
mod stats;
mod store;
mod telegram;

use api::{create_router, AppState};
use chart::PngChartRenderer;
use config::BotConfig;
use runtime::{ProductionRegistry, SessionRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use store::ExerciseStore;
use telegram::TelegramTransport;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymbot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env()?;

    let store = ExerciseStore::load(&config.data_file);
    tracing::info!(
        path = %store.path().display(),
        exercises = store.read(|week| week.iter().map(|(_, records)| records.len()).sum::<usize>()),
        "Exercise store loaded"
    );

    let transport = TelegramTransport::new(&config.telegram_api_url, config.token.clone())?;
    if let Some(url) = config.webhook_url() {
        match transport.set_webhook(&url).await {
            Ok(()) => tracing::info!(base = ?config.app_url, "Webhook registered"),
            Err(e) => tracing::error!(error = %e, "Failed to register webhook"),
        }
    } else {
        tracing::warn!("APP_URL not set, skipping webhook registration");
    }

    tracing::info!(
        rest_min = ?config.rest.min,
        rest_max = ?config.rest.max,
        "Session registry initialized"
    );
    let registry: Arc<ProductionRegistry> = Arc::new(SessionRegistry::new(
        store,
        transport,
        PngChartRenderer,
        config.rest,
    ));

    let state = AppState::new(registry, &config.token);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("gymbot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
