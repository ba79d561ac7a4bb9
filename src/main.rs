use std::time::Duration;

use tracing_subscriber::EnvFilter;

use abstract_annotator::api;
use abstract_annotator::config::Config;
use abstract_annotator::state::AppState;
use abstract_annotator::table::{loader, Table};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let table = match loader::load(&config.data_path) {
        Ok((path, table)) => {
            tracing::info!("Data file: {}", path.display());
            tracing::info!(
                "Loaded {} abstracts ({} with text)",
                table.len(),
                table.with_abstract_count()
            );
            tracing::info!("Columns: {}", table.columns().join(", "));
            table
        }
        Err(e) => {
            tracing::warn!("Starting with an empty table: {e:#}");
            Table::default()
        }
    };
    tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.base_url);

    let state = AppState::new(config.clone(), table)?;

    let sweeper = state.clone();
    let interval = Duration::from_secs(config.sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sweeper.sweep_expired();
        }
    });

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
