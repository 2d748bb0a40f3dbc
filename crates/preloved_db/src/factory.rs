//! Factory for creating database clients

use crate::client::DbClient;
use crate::error::DbError;
use crate::schema;
use preloved_config::AppConfig;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct DbClientFactory;

impl DbClientFactory {
    pub fn new() -> Self {
        Self
    }

    /// Connect using the `database` section and bootstrap the schema.
    ///
    /// # Errors
    ///
    /// * The database configuration is missing
    /// * The connection or a schema statement fails
    pub async fn from_app_config(&self, config: &Arc<AppConfig>) -> Result<DbClient, DbError> {
        debug!("Creating database client from application configuration");

        let client = DbClient::new(config).await?;
        schema::init_schema(&client).await?;
        Ok(client)
    }

    /// Connect to `db_url` and bootstrap the schema.
    pub async fn from_url(&self, db_url: &str) -> Result<DbClient, DbError> {
        debug!("Creating database client from URL");

        let client = DbClient::from_url(db_url).await?;
        schema::init_schema(&client).await?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preloved_config::DatabaseConfig;

    #[tokio::test]
    async fn missing_section_is_a_config_error() {
        let config = Arc::new(AppConfig::default());
        let result = DbClientFactory::new().from_app_config(&config).await;
        assert!(matches!(result, Err(DbError::ConfigError(_))));
    }

    #[tokio::test]
    async fn creates_nested_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preloved.db");
        let config = Arc::new(AppConfig {
            database: Some(DatabaseConfig {
                url: format!("sqlite://{}", path.display()),
            }),
            ..AppConfig::default()
        });

        let client = DbClientFactory::new().from_app_config(&config).await.unwrap();
        assert!(path.exists());
        assert!(client.is_healthy().await);
        // schema bootstrap is idempotent
        schema::init_schema(&client).await.unwrap();
    }
}
