use preloved_common::services::ServiceFactory;
use preloved_common::PrelovedError;
use preloved_config::AppConfig;
use std::sync::Arc;

use crate::service_factory::PrelovedServiceFactory;

/// Application state shared by the router builders.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service_factory: Arc<dyn ServiceFactory>,
}

impl AppState {
    /// Builds the service factory from the configuration.
    ///
    /// # Errors
    ///
    /// See [`PrelovedServiceFactory::new`].
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, PrelovedError> {
        let service_factory = Arc::new(PrelovedServiceFactory::new(config.clone()).await?);
        Ok(Self {
            config,
            service_factory,
        })
    }

    /// State over an existing factory, e.g. one with test doubles.
    pub fn with_factory(config: Arc<AppConfig>, service_factory: Arc<dyn ServiceFactory>) -> Self {
        Self {
            config,
            service_factory,
        }
    }
}
