//! Read-only lookups into listings and comments.

use crate::error::DbError;
use crate::repositories::{decode_timestamp, nullable};
use crate::DbClient;
use preloved_common::models::{CommentSummary, ProductSummary};
use preloved_common::services::{BoxFuture, CatalogLookup};
use preloved_common::PrelovedError;
use sqlx::any::AnyRow;
use sqlx::Row;

#[derive(Debug, Clone)]
pub struct SqlCatalogRepository {
    db_client: DbClient,
}

impl SqlCatalogRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn product(&self, product_id: i64) -> Result<Option<ProductSummary>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.user_id, p.name, p.image_products,
                (SELECT pi.path FROM product_images pi
                 WHERE pi.product_id = p.id
                 ORDER BY pi.sort_order ASC, pi.id ASC
                 LIMIT 1) AS first_image
            FROM products p
            WHERE p.id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let first_image: Option<String> = nullable(&row, "first_image")?;
        let legacy_image: Option<String> = nullable(&row, "image_products")?;

        Ok(Some(ProductSummary {
            id: row.try_get("id")?,
            owner_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            cover_image: first_image
                .filter(|p| !p.is_empty())
                .or(legacy_image.filter(|p| !p.is_empty())),
        }))
    }

    pub async fn comment(&self, comment_id: i64) -> Result<Option<CommentSummary>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT id, product_id, user_id, comment, parent_comment_id, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.as_ref().map(comment_from_row).transpose()
    }
}

pub(crate) fn comment_from_row(row: &AnyRow) -> Result<CommentSummary, DbError> {
    let created_at: String = row.try_get("created_at")?;

    Ok(CommentSummary {
        id: row.try_get("id")?,
        product_id: row.try_get("product_id")?,
        author_id: row.try_get("user_id")?,
        text: row.try_get("comment")?,
        parent_comment_id: nullable(row, "parent_comment_id")?,
        created_at: decode_timestamp(&created_at)?,
    })
}

impl CatalogLookup for SqlCatalogRepository {
    fn find_product(
        &self,
        product_id: i64,
    ) -> BoxFuture<'_, Option<ProductSummary>, PrelovedError> {
        Box::pin(async move { Ok(self.product(product_id).await?) })
    }

    fn find_comment(
        &self,
        comment_id: i64,
    ) -> BoxFuture<'_, Option<CommentSummary>, PrelovedError> {
        Box::pin(async move { Ok(self.comment(comment_id).await?) })
    }
}
