//! Users table access: profile lookup and the single device token per user.

use crate::error::DbError;
use crate::repositories::nullable;
use crate::DbClient;
use preloved_common::models::UserProfile;
use preloved_common::services::{BoxFuture, UserDirectory};
use preloved_common::PrelovedError;
use sqlx::Row;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct SqlUserDirectory {
    db_client: DbClient,
}

impl SqlUserDirectory {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn find_by_id(&self, user_id: i64) -> Result<Option<UserProfile>, DbError> {
        let row = sqlx::query("SELECT id, name, fcm_token FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find user {}: {}", user_id, e);
                DbError::QueryError(e.to_string())
            })?;

        match row {
            Some(row) => {
                let token: Option<String> = nullable(&row, "fcm_token")?;
                Ok(Some(UserProfile {
                    id: row.try_get("id")?,
                    display_name: row.try_get("name")?,
                    push_token: token.filter(|t| !t.is_empty()),
                }))
            }
            None => Ok(None),
        }
    }

    /// Overwrites the stored token. One device per user.
    pub async fn set_token(&self, user_id: i64, token: &str) -> Result<bool, DbError> {
        debug!("Updating device token for user {}", user_id);

        let result = sqlx::query("UPDATE users SET fcm_token = $1 WHERE id = $2")
            .bind(token)
            .bind(user_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update device token: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        let updated = result.rows_affected() > 0;
        if updated {
            info!("Device token updated for user {}", user_id);
        }
        Ok(updated)
    }
}

impl UserDirectory for SqlUserDirectory {
    fn find_user(&self, user_id: i64) -> BoxFuture<'_, Option<UserProfile>, PrelovedError> {
        Box::pin(async move { Ok(self.find_by_id(user_id).await?) })
    }

    fn update_push_token(
        &self,
        user_id: i64,
        token: String,
    ) -> BoxFuture<'_, bool, PrelovedError> {
        Box::pin(async move { Ok(self.set_token(user_id, &token).await?) })
    }
}
