//! Comment and favourite writes.

use crate::error::DbError;
use crate::repositories::catalog_sql::comment_from_row;
use crate::repositories::encode_timestamp;
use crate::DbClient;
use chrono::Utc;
use preloved_common::models::{CommentSummary, NewComment};
use preloved_common::services::{BoxFuture, MarketStore};
use preloved_common::PrelovedError;
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct SqlMarketRepository {
    db_client: DbClient,
}

impl SqlMarketRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn insert_comment(&self, comment: NewComment) -> Result<CommentSummary, DbError> {
        debug!(
            "Storing comment on product {} by user {}",
            comment.product_id, comment.author_id
        );

        let row = sqlx::query(
            r#"
            INSERT INTO comments (product_id, user_id, comment, parent_comment_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, user_id, comment, parent_comment_id, created_at
            "#,
        )
        .bind(comment.product_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.parent_comment_id)
        .bind(encode_timestamp(Utc::now()))
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert comment: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        comment_from_row(&row)
    }

    pub async fn favorite_exists(&self, user_id: i64, product_id: i64) -> Result<bool, DbError> {
        let row = sqlx::query("SELECT id FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(row.is_some())
    }

    /// A concurrent duplicate hits the unique key and is reported as `false`.
    pub async fn insert_favorite(&self, user_id: i64, product_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO favorites (user_id, product_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(encode_timestamp(Utc::now()))
        .execute(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_favorite(&self, user_id: i64, product_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

impl MarketStore for SqlMarketRepository {
    fn create_comment(&self, comment: NewComment) -> BoxFuture<'_, CommentSummary, PrelovedError> {
        Box::pin(async move { Ok(self.insert_comment(comment).await?) })
    }

    fn is_favorite(&self, user_id: i64, product_id: i64) -> BoxFuture<'_, bool, PrelovedError> {
        Box::pin(async move { Ok(self.favorite_exists(user_id, product_id).await?) })
    }

    fn add_favorite(&self, user_id: i64, product_id: i64) -> BoxFuture<'_, bool, PrelovedError> {
        Box::pin(async move { Ok(self.insert_favorite(user_id, product_id).await?) })
    }

    fn remove_favorite(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> BoxFuture<'_, bool, PrelovedError> {
        Box::pin(async move { Ok(self.delete_favorite(user_id, product_id).await?) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::catalog_sql::SqlCatalogRepository;
    use crate::repositories::test_support::{seed_product, seed_user, sqlite_client};

    #[tokio::test]
    async fn favourite_toggle_absorbs_duplicates() {
        let (_dir, client) = sqlite_client().await;
        let market = SqlMarketRepository::new(client);

        assert!(!market.favorite_exists(1, 10).await.unwrap());
        assert!(market.insert_favorite(1, 10).await.unwrap());
        assert!(!market.insert_favorite(1, 10).await.unwrap());
        assert!(market.favorite_exists(1, 10).await.unwrap());

        assert!(market.delete_favorite(1, 10).await.unwrap());
        assert!(!market.delete_favorite(1, 10).await.unwrap());
    }

    #[tokio::test]
    async fn stored_comment_is_readable_through_catalog() {
        let (_dir, client) = sqlite_client().await;
        let owner = seed_user(&client, "Owner", None).await;
        let product = seed_product(&client, owner, "Lamp", None).await;
        let market = SqlMarketRepository::new(client.clone());

        let parent = market
            .insert_comment(NewComment {
                product_id: product,
                author_id: 7,
                text: "Still available?".to_string(),
                parent_comment_id: None,
            })
            .await
            .unwrap();
        let reply = market
            .insert_comment(NewComment {
                product_id: product,
                author_id: owner,
                text: "Yes".to_string(),
                parent_comment_id: Some(parent.id),
            })
            .await
            .unwrap();

        let catalog = SqlCatalogRepository::new(client);
        let loaded = catalog.comment(reply.id).await.unwrap().unwrap();
        assert_eq!(loaded.parent_comment_id, Some(parent.id));
        assert_eq!(loaded.author_id, owner);
        assert_eq!(loaded.text, "Yes");
    }
}
