use std::sync::Arc;

use crate::assembler::ExportOptions;
use crate::config::Config;
use crate::fetch::AssetFetcher;
use crate::geometry::PageGeometry;
use crate::store::RecordStore;

/// Shared application state injected into route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub fetcher: Arc<dyn AssetFetcher>,
    /// Validated once at startup; every export uses the same page layout.
    pub geometry: PageGeometry,
    pub config: Config,
}

impl AppState {
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            fetch_concurrency: self.config.fetch_concurrency,
            fetch_timeout: self.config.fetch_timeout,
        }
    }
}
