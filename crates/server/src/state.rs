//! Shared application state.

use std::sync::Arc;

use leadflow_config::ServerSettings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<ServerSettings>,
}

impl AppState {
    pub fn new(settings: ServerSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}
