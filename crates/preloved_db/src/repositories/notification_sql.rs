//! SQL implementation of the notification store

use crate::error::DbError;
use crate::repositories::{decode_timestamp, encode_timestamp, nullable};
use crate::DbClient;
use chrono::Utc;
use preloved_common::models::{NewNotification, NotificationKind, NotificationRecord};
use preloved_common::services::{BoxFuture, NotificationStore};
use preloved_common::PrelovedError;
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error};

const COLUMNS: &str =
    "id, user_id, actor_id, product_id, comment_id, type, title, message, is_read, created_at";

#[derive(Debug, Clone)]
pub struct SqlNotificationRepository {
    db_client: DbClient,
}

impl SqlNotificationRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn insert(&self, notification: NewNotification) -> Result<NotificationRecord, DbError> {
        debug!(
            recipient_id = notification.recipient_user_id,
            kind = %notification.kind,
            "Inserting notification"
        );

        let query = format!(
            r#"
            INSERT INTO notifications
                (user_id, actor_id, product_id, comment_id, type, title, message, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8)
            RETURNING {}
            "#,
            COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(notification.recipient_user_id)
            .bind(notification.actor_user_id)
            .bind(notification.related_product_id)
            .bind(notification.related_comment_id)
            .bind(notification.kind.as_str())
            .bind(&notification.title)
            .bind(&notification.body)
            .bind(encode_timestamp(Utc::now()))
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert notification: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        record_from_row(&row)
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<NotificationRecord>, DbError> {
        let query = format!(
            "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list notifications: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(record_from_row).collect()
    }

    pub async fn set_read(&self, user_id: i64, notification_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE id = $1 AND user_id = $2 AND is_read = 0",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_all_read(&self, user_id: i64) -> Result<u64, DbError> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = $1 AND is_read = 0")
                .bind(user_id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(result.rows_affected())
    }

    pub async fn count_unread(&self, user_id: i64) -> Result<i64, DbError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS unread FROM notifications WHERE user_id = $1 AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(row.try_get::<i64, _>("unread")?)
    }

    pub async fn remove(&self, user_id: i64, notification_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id)
            .bind(user_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn wishlist_records(
        &self,
        recipient_id: i64,
        product_id: i64,
    ) -> Result<Vec<NotificationRecord>, DbError> {
        let query = format!(
            r#"
            SELECT {} FROM notifications
            WHERE user_id = $1 AND product_id = $2 AND type = $3
            ORDER BY created_at DESC, id DESC
            "#,
            COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(recipient_id)
            .bind(product_id)
            .bind(NotificationKind::Wishlist.as_str())
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: &AnyRow) -> Result<NotificationRecord, DbError> {
    let kind: String = row.try_get("type")?;
    let is_read: i64 = row.try_get("is_read")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(NotificationRecord {
        id: row.try_get("id")?,
        recipient_user_id: row.try_get("user_id")?,
        actor_user_id: nullable(row, "actor_id")?,
        kind: NotificationKind::from_db(&kind),
        title: row.try_get("title")?,
        body: row.try_get("message")?,
        related_product_id: nullable(row, "product_id")?,
        related_comment_id: nullable(row, "comment_id")?,
        is_read: is_read != 0,
        created_at: decode_timestamp(&created_at)?,
    })
}

impl NotificationStore for SqlNotificationRepository {
    fn create(
        &self,
        notification: NewNotification,
    ) -> BoxFuture<'_, NotificationRecord, PrelovedError> {
        Box::pin(async move { Ok(self.insert(notification).await?) })
    }

    fn list_for_recipient(
        &self,
        user_id: i64,
    ) -> BoxFuture<'_, Vec<NotificationRecord>, PrelovedError> {
        Box::pin(async move { Ok(self.list(user_id).await?) })
    }

    fn mark_read(&self, user_id: i64, notification_id: i64) -> BoxFuture<'_, bool, PrelovedError> {
        Box::pin(async move { Ok(self.set_read(user_id, notification_id).await?) })
    }

    fn mark_all_read(&self, user_id: i64) -> BoxFuture<'_, u64, PrelovedError> {
        Box::pin(async move { Ok(self.set_all_read(user_id).await?) })
    }

    fn unread_count(&self, user_id: i64) -> BoxFuture<'_, i64, PrelovedError> {
        Box::pin(async move { Ok(self.count_unread(user_id).await?) })
    }

    fn delete(&self, user_id: i64, notification_id: i64) -> BoxFuture<'_, bool, PrelovedError> {
        Box::pin(async move { Ok(self.remove(user_id, notification_id).await?) })
    }

    fn find_wishlist(
        &self,
        recipient_id: i64,
        product_id: i64,
    ) -> BoxFuture<'_, Vec<NotificationRecord>, PrelovedError> {
        Box::pin(async move { Ok(self.wishlist_records(recipient_id, product_id).await?) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::sqlite_client;

    fn new_notification(recipient: i64, kind: NotificationKind) -> NewNotification {
        NewNotification {
            recipient_user_id: recipient,
            actor_user_id: Some(99),
            kind,
            title: "Your post got a comment".to_string(),
            body: "Dina commented on your post".to_string(),
            related_product_id: Some(5),
            related_comment_id: None,
        }
    }

    #[tokio::test]
    async fn insert_then_list_newest_first() {
        let (_dir, client) = sqlite_client().await;
        let repo = SqlNotificationRepository::new(client);

        let first = repo
            .insert(new_notification(1, NotificationKind::Comment))
            .await
            .unwrap();
        let second = repo
            .insert(new_notification(1, NotificationKind::Wishlist))
            .await
            .unwrap();
        repo.insert(new_notification(2, NotificationKind::Comment))
            .await
            .unwrap();

        assert!(!first.is_read);
        assert_eq!(first.actor_user_id, Some(99));

        let listed = repo.list(1).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(listed[0].kind, NotificationKind::Wishlist);
    }

    #[tokio::test]
    async fn read_state_is_scoped_to_owner() {
        let (_dir, client) = sqlite_client().await;
        let repo = SqlNotificationRepository::new(client);

        let mine = repo
            .insert(new_notification(1, NotificationKind::Comment))
            .await
            .unwrap();
        repo.insert(new_notification(1, NotificationKind::Reply))
            .await
            .unwrap();

        assert!(!repo.set_read(2, mine.id).await.unwrap());
        assert!(repo.set_read(1, mine.id).await.unwrap());
        assert!(!repo.set_read(1, mine.id).await.unwrap());
        assert_eq!(repo.count_unread(1).await.unwrap(), 1);

        assert_eq!(repo.set_all_read(1).await.unwrap(), 1);
        assert_eq!(repo.count_unread(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_stored_kind_reads_as_system() {
        let (_dir, client) = sqlite_client().await;
        client
            .execute(
                "INSERT INTO notifications (user_id, type, title, message, is_read, created_at) \
                 VALUES (3, 'like', 't', 'm', 0, '2026-01-01T00:00:00.000000Z')",
            )
            .await
            .unwrap();

        let repo = SqlNotificationRepository::new(client);
        let listed = repo.list(3).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].kind, NotificationKind::System);
        assert_eq!(listed[0].actor_user_id, None);
    }

    #[tokio::test]
    async fn delete_and_wishlist_lookup() {
        let (_dir, client) = sqlite_client().await;
        let repo = SqlNotificationRepository::new(client);

        let wish = repo
            .insert(new_notification(1, NotificationKind::Wishlist))
            .await
            .unwrap();
        repo.insert(new_notification(1, NotificationKind::Comment))
            .await
            .unwrap();

        let found = repo.wishlist_records(1, 5).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, wish.id);

        assert!(!repo.remove(2, wish.id).await.unwrap());
        assert!(repo.remove(1, wish.id).await.unwrap());
        assert!(repo.wishlist_records(1, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_references_read_back_as_none() {
        let (_dir, client) = sqlite_client().await;
        let repo = SqlNotificationRepository::new(client);

        let visit = repo
            .insert(NewNotification {
                recipient_user_id: 4,
                actor_user_id: None,
                kind: NotificationKind::ProfileVisit,
                title: "Profile visited".to_string(),
                body: "Someone visited your profile".to_string(),
                related_product_id: None,
                related_comment_id: None,
            })
            .await
            .unwrap();
        assert_eq!(visit.actor_user_id, None);
        assert_eq!(visit.related_product_id, None);
        assert_eq!(visit.related_comment_id, None);

        let listed = repo.list(4).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, visit.id);
        assert_eq!(listed[0].related_comment_id, None);
        assert_eq!(repo.count_unread(4).await.unwrap(), 1);
    }
}
