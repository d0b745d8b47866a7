//! Process-level infrastructure shared by every other crate: command line and
//! environment configuration, and console logging.

use config::Config;
use std::sync::Arc;

pub mod config;
pub mod logging;

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(app_config: Config) -> Self {
        Self {
            config: Arc::new(app_config),
        }
    }

    pub fn config_ref(&self) -> &Config {
        self.config.as_ref()
    }
}
