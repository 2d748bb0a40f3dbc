//! Service factory implementation.
//!
//! Picks the storage backend (SQL when a `database` section is configured,
//! in-memory otherwise) and the push sender, once, at startup.

use preloved_common::services::{
    CatalogLookup, MarketStore, NotificationStore, PushSender, ServiceFactory, UserDirectory,
};
use preloved_common::{log_result, PrelovedError};
use preloved_config::AppConfig;
use preloved_db::{
    DbClientFactory, MemoryStore, RepositoryFactory, SqlCatalogRepository, SqlMarketRepository,
    SqlNotificationRepository, SqlRepositoryFactory, SqlUserDirectory,
};
use preloved_firebase::build_push_adapter;
use std::sync::Arc;
use tracing::{info, warn};

pub struct PrelovedServiceFactory {
    notification_store: Arc<dyn NotificationStore>,
    user_directory: Arc<dyn UserDirectory>,
    catalog: Arc<dyn CatalogLookup>,
    market_store: Arc<dyn MarketStore>,
    push_sender: Option<Arc<dyn PushSender>>,
}

impl PrelovedServiceFactory {
    /// # Errors
    ///
    /// * The configured database cannot be opened or bootstrapped
    /// * The push HTTP client cannot be built
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, PrelovedError> {
        let mut factory = match config.database.as_ref() {
            Some(_) => {
                info!("Initializing SQL storage...");
                let client = log_result(
                    DbClientFactory::new().from_app_config(&config).await,
                    "Database connected",
                    "Database connection failed",
                )?;
                let repositories = SqlRepositoryFactory::new();
                let notifications: SqlNotificationRepository =
                    repositories.create_repository(client.clone());
                let users: SqlUserDirectory = repositories.create_repository(client.clone());
                let catalog: SqlCatalogRepository = repositories.create_repository(client.clone());
                let market: SqlMarketRepository = repositories.create_repository(client);
                Self {
                    notification_store: Arc::new(notifications),
                    user_directory: Arc::new(users),
                    catalog: Arc::new(catalog),
                    market_store: Arc::new(market),
                    push_sender: None,
                }
            }
            None => {
                warn!("No database configured; using in-memory storage (data is lost on restart)");
                Self::in_memory(Arc::new(MemoryStore::new()))
            }
        };

        if let Some(adapter) = build_push_adapter(&config, factory.user_directory.clone()).await? {
            factory.push_sender = Some(adapter);
        }
        Ok(factory)
    }

    /// All stores backed by one [`MemoryStore`], push disabled.
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            notification_store: store.clone(),
            user_directory: store.clone(),
            catalog: store.clone(),
            market_store: store,
            push_sender: None,
        }
    }

    pub fn with_push_sender(mut self, push_sender: Arc<dyn PushSender>) -> Self {
        self.push_sender = Some(push_sender);
        self
    }
}

impl ServiceFactory for PrelovedServiceFactory {
    fn notification_store(&self) -> Arc<dyn NotificationStore> {
        self.notification_store.clone()
    }

    fn user_directory(&self) -> Arc<dyn UserDirectory> {
        self.user_directory.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogLookup> {
        self.catalog.clone()
    }

    fn market_store(&self) -> Arc<dyn MarketStore> {
        self.market_store.clone()
    }

    fn push_sender(&self) -> Option<Arc<dyn PushSender>> {
        self.push_sender.clone()
    }
}
