use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::gesture::registry::DetectorRegistry;
use crate::store::InventoryStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InventoryStore>,
    pub config: Config,
    /// One detector per device, created on its first motion batch and
    /// dropped after `config.shake_idle_timeout` without one.
    pub shake_detectors: Arc<Mutex<DetectorRegistry>>,
}

impl AppState {
    pub fn new(store: Arc<dyn InventoryStore>, config: Config) -> Self {
        let registry = DetectorRegistry::new(config.shake, config.shake_idle_timeout);
        Self {
            store,
            config,
            shake_detectors: Arc::new(Mutex::new(registry)),
        }
    }
}
