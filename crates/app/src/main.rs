//! Noticeboard - local data host for the community site
//!
//! Boots the persisted collections (seeding them on first run), logs
//! what was loaded and writes an export snapshot next to the data.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod platform;
mod state;

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Noticeboard");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize application state
    let app_state = match runtime.block_on(state::AppState::new()) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    app_state.log_summary();

    match app_state.write_export() {
        Ok(path) => tracing::info!(path = %path.display(), "Export written"),
        Err(e) => tracing::error!("Failed to write export: {}", e),
    }
}
