use std::sync::Arc;

use shared_config::AppConfig;

use crate::store::AppointmentStore;

/// Shared application state handed to every cell router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AppointmentStore>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn AppointmentStore>) -> Self {
        Self { config, store }
    }
}
