//! Factory for the SQL repositories

use crate::repositories::{
    SqlCatalogRepository, SqlMarketRepository, SqlNotificationRepository, SqlUserDirectory,
};
use crate::{DbClient, RepositoryFactory};

/// Builds every SQL repository over one shared pool.
#[derive(Debug, Clone, Default)]
pub struct SqlRepositoryFactory;

impl SqlRepositoryFactory {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFactory<SqlNotificationRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlNotificationRepository {
        SqlNotificationRepository::new(db_client)
    }
}

impl RepositoryFactory<SqlUserDirectory, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlUserDirectory {
        SqlUserDirectory::new(db_client)
    }
}

impl RepositoryFactory<SqlCatalogRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlCatalogRepository {
        SqlCatalogRepository::new(db_client)
    }
}

impl RepositoryFactory<SqlMarketRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlMarketRepository {
        SqlMarketRepository::new(db_client)
    }
}
