use std::sync::Arc;

use crate::annotate::{AnnotationManager, ResultStore};
use crate::config::Config;
use crate::table::Table;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub table: Arc<Table>,
    pub results: Arc<ResultStore>,
    pub annotator: AnnotationManager,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, table: Table) -> anyhow::Result<Self> {
        let results = Arc::new(ResultStore::new(config.result_retention()));
        let annotator = AnnotationManager::new(results.clone(), config.max_threads);

        Ok(Self {
            table: Arc::new(table),
            results,
            annotator,
            http_client: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            config,
        })
    }

    /// Drop expired annotation results. Cheap when nothing expired.
    pub fn sweep_expired(&self) -> usize {
        let removed = self.results.sweep(chrono::Utc::now());
        if removed > 0 {
            tracing::debug!("Expiry sweep removed {removed} annotation tasks");
        }
        removed
    }
}
