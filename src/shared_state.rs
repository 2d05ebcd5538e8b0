use std::sync::Arc;

use crate::config::Config;
use crate::engine::catalog::ProductCatalog;

/// State shared across requests. Config and catalog are loaded once at
/// startup and read-only afterwards, so handlers share them without locks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<ProductCatalog>,
}

impl AppState {
    pub fn new(config: Config, catalog: ProductCatalog) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
        }
    }
}
