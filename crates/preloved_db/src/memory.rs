//! In-memory implementation of every store trait.
//!
//! Used when no `database` section is configured and as the fixture store in
//! tests across the workspace. Semantics match the SQL repositories,
//! including newest-first ordering and per-recipient scoping.

use chrono::Utc;
use parking_lot::RwLock;
use preloved_common::models::{
    CommentSummary, NewComment, NewNotification, NotificationKind, NotificationRecord,
    ProductSummary, UserProfile,
};
use preloved_common::services::{
    BoxFuture, CatalogLookup, MarketStore, NotificationStore, UserDirectory,
};
use preloved_common::PrelovedError;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct ProductRow {
    owner_id: i64,
    name: String,
    image: Option<String>,
    // (sort_order, insertion id, path)
    gallery: Vec<(i64, i64, String)>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, UserProfile>,
    products: BTreeMap<i64, ProductRow>,
    comments: BTreeMap<i64, CommentSummary>,
    favorites: BTreeSet<(i64, i64)>,
    notifications: Vec<NotificationRecord>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn newest_first(&self, filter: impl Fn(&NotificationRecord) -> bool) -> Vec<NotificationRecord> {
        let mut found: Vec<NotificationRecord> = self
            .notifications
            .iter()
            .filter(|n| filter(n))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        found
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user and returns its id.
    pub fn insert_user(&self, name: &str, push_token: Option<&str>) -> i64 {
        let mut state = self.state.write();
        let id = state.next_id();
        state.users.insert(
            id,
            UserProfile {
                id,
                display_name: name.to_string(),
                push_token: push_token.map(str::to_string),
            },
        );
        id
    }

    /// Adds a listing and returns its id.
    pub fn insert_product(&self, owner_id: i64, name: &str, image: Option<&str>) -> i64 {
        let mut state = self.state.write();
        let id = state.next_id();
        state.products.insert(
            id,
            ProductRow {
                owner_id,
                name: name.to_string(),
                image: image.map(str::to_string),
                gallery: Vec::new(),
            },
        );
        id
    }

    pub fn add_product_image(&self, product_id: i64, path: &str, sort_order: i64) {
        let mut state = self.state.write();
        let image_id = state.next_id();
        if let Some(product) = state.products.get_mut(&product_id) {
            product.gallery.push((sort_order, image_id, path.to_string()));
        }
    }

    /// Total stored notifications across all users.
    pub fn notification_count(&self) -> usize {
        self.state.read().notifications.len()
    }
}

impl NotificationStore for MemoryStore {
    fn create(
        &self,
        notification: NewNotification,
    ) -> BoxFuture<'_, NotificationRecord, PrelovedError> {
        let record = {
            let mut state = self.state.write();
            let record = NotificationRecord {
                id: state.next_id(),
                recipient_user_id: notification.recipient_user_id,
                actor_user_id: notification.actor_user_id,
                kind: notification.kind,
                title: notification.title,
                body: notification.body,
                related_product_id: notification.related_product_id,
                related_comment_id: notification.related_comment_id,
                is_read: false,
                created_at: Utc::now(),
            };
            state.notifications.push(record.clone());
            record
        };
        Box::pin(async move { Ok(record) })
    }

    fn list_for_recipient(
        &self,
        user_id: i64,
    ) -> BoxFuture<'_, Vec<NotificationRecord>, PrelovedError> {
        let found = self
            .state
            .read()
            .newest_first(move |n| n.recipient_user_id == user_id);
        Box::pin(async move { Ok(found) })
    }

    fn mark_read(&self, user_id: i64, notification_id: i64) -> BoxFuture<'_, bool, PrelovedError> {
        let updated = {
            let mut state = self.state.write();
            match state
                .notifications
                .iter_mut()
                .find(|n| n.id == notification_id && n.recipient_user_id == user_id && !n.is_read)
            {
                Some(n) => {
                    n.is_read = true;
                    true
                }
                None => false,
            }
        };
        Box::pin(async move { Ok(updated) })
    }

    fn mark_all_read(&self, user_id: i64) -> BoxFuture<'_, u64, PrelovedError> {
        let updated = {
            let mut state = self.state.write();
            let mut updated = 0u64;
            for n in state
                .notifications
                .iter_mut()
                .filter(|n| n.recipient_user_id == user_id && !n.is_read)
            {
                n.is_read = true;
                updated += 1;
            }
            updated
        };
        Box::pin(async move { Ok(updated) })
    }

    fn unread_count(&self, user_id: i64) -> BoxFuture<'_, i64, PrelovedError> {
        let count = self
            .state
            .read()
            .notifications
            .iter()
            .filter(|n| n.recipient_user_id == user_id && !n.is_read)
            .count() as i64;
        Box::pin(async move { Ok(count) })
    }

    fn delete(&self, user_id: i64, notification_id: i64) -> BoxFuture<'_, bool, PrelovedError> {
        let deleted = {
            let mut state = self.state.write();
            let before = state.notifications.len();
            state
                .notifications
                .retain(|n| !(n.id == notification_id && n.recipient_user_id == user_id));
            state.notifications.len() != before
        };
        Box::pin(async move { Ok(deleted) })
    }

    fn find_wishlist(
        &self,
        recipient_id: i64,
        product_id: i64,
    ) -> BoxFuture<'_, Vec<NotificationRecord>, PrelovedError> {
        let found = self.state.read().newest_first(move |n| {
            n.recipient_user_id == recipient_id
                && n.related_product_id == Some(product_id)
                && n.kind == NotificationKind::Wishlist
        });
        Box::pin(async move { Ok(found) })
    }
}

impl UserDirectory for MemoryStore {
    fn find_user(&self, user_id: i64) -> BoxFuture<'_, Option<UserProfile>, PrelovedError> {
        let user = self.state.read().users.get(&user_id).cloned().map(|mut u| {
            u.push_token = u.push_token.filter(|t| !t.is_empty());
            u
        });
        Box::pin(async move { Ok(user) })
    }

    fn update_push_token(
        &self,
        user_id: i64,
        token: String,
    ) -> BoxFuture<'_, bool, PrelovedError> {
        let updated = match self.state.write().users.get_mut(&user_id) {
            Some(user) => {
                user.push_token = Some(token);
                true
            }
            None => false,
        };
        Box::pin(async move { Ok(updated) })
    }
}

impl CatalogLookup for MemoryStore {
    fn find_product(
        &self,
        product_id: i64,
    ) -> BoxFuture<'_, Option<ProductSummary>, PrelovedError> {
        let product = self.state.read().products.get(&product_id).map(|row| {
            let first = row
                .gallery
                .iter()
                .min_by_key(|(sort_order, image_id, _)| (*sort_order, *image_id))
                .map(|(_, _, path)| path.clone());
            ProductSummary {
                id: product_id,
                owner_id: row.owner_id,
                name: row.name.clone(),
                cover_image: first
                    .filter(|p| !p.is_empty())
                    .or_else(|| row.image.clone().filter(|p| !p.is_empty())),
            }
        });
        Box::pin(async move { Ok(product) })
    }

    fn find_comment(
        &self,
        comment_id: i64,
    ) -> BoxFuture<'_, Option<CommentSummary>, PrelovedError> {
        let comment = self.state.read().comments.get(&comment_id).cloned();
        Box::pin(async move { Ok(comment) })
    }
}

impl MarketStore for MemoryStore {
    fn create_comment(&self, comment: NewComment) -> BoxFuture<'_, CommentSummary, PrelovedError> {
        let stored = {
            let mut state = self.state.write();
            let stored = CommentSummary {
                id: state.next_id(),
                product_id: comment.product_id,
                author_id: comment.author_id,
                text: comment.text,
                parent_comment_id: comment.parent_comment_id,
                created_at: Utc::now(),
            };
            state.comments.insert(stored.id, stored.clone());
            stored
        };
        Box::pin(async move { Ok(stored) })
    }

    fn is_favorite(&self, user_id: i64, product_id: i64) -> BoxFuture<'_, bool, PrelovedError> {
        let exists = self.state.read().favorites.contains(&(user_id, product_id));
        Box::pin(async move { Ok(exists) })
    }

    fn add_favorite(&self, user_id: i64, product_id: i64) -> BoxFuture<'_, bool, PrelovedError> {
        let inserted = self.state.write().favorites.insert((user_id, product_id));
        Box::pin(async move { Ok(inserted) })
    }

    fn remove_favorite(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> BoxFuture<'_, bool, PrelovedError> {
        let removed = self.state.write().favorites.remove(&(user_id, product_id));
        Box::pin(async move { Ok(removed) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wishlist_for(recipient: i64, actor: i64, product: i64) -> NewNotification {
        NewNotification {
            recipient_user_id: recipient,
            actor_user_id: Some(actor),
            kind: NotificationKind::Wishlist,
            title: "Your product was wishlisted".to_string(),
            body: "Someone added \"Lamp\" to wishlist".to_string(),
            related_product_id: Some(product),
            related_comment_id: None,
        }
    }

    #[tokio::test]
    async fn notifications_are_scoped_and_ordered() {
        let store = MemoryStore::new();
        let a = store.create(wishlist_for(1, 2, 10)).await.unwrap();
        let b = store.create(wishlist_for(1, 3, 10)).await.unwrap();
        store.create(wishlist_for(4, 2, 10)).await.unwrap();

        let listed = store.list_for_recipient(1).await.unwrap();
        assert_eq!(
            listed.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![b.id, a.id]
        );
        assert_eq!(store.find_wishlist(1, 10).await.unwrap().len(), 2);
        assert!(store.find_wishlist(1, 11).await.unwrap().is_empty());

        assert!(!store.mark_read(4, a.id).await.unwrap());
        assert!(store.mark_read(1, a.id).await.unwrap());
        assert_eq!(store.unread_count(1).await.unwrap(), 1);
        assert_eq!(store.mark_all_read(1).await.unwrap(), 1);
        assert_eq!(store.unread_count(1).await.unwrap(), 0);

        assert!(!store.delete(4, b.id).await.unwrap());
        assert!(store.delete(1, b.id).await.unwrap());
        assert_eq!(store.notification_count(), 2);
    }

    #[tokio::test]
    async fn cover_image_falls_back_to_listing_image() {
        let store = MemoryStore::new();
        let owner = store.insert_user("Owner", None);
        let product = store.insert_product(owner, "Lamp", Some("products/lamp.jpg"));

        let summary = store.find_product(product).await.unwrap().unwrap();
        assert_eq!(summary.cover_image.as_deref(), Some("products/lamp.jpg"));

        store.add_product_image(product, "products/b.jpg", 2);
        store.add_product_image(product, "products/a.jpg", 1);
        let summary = store.find_product(product).await.unwrap().unwrap();
        assert_eq!(summary.cover_image.as_deref(), Some("products/a.jpg"));
    }

    #[tokio::test]
    async fn token_and_favourites() {
        let store = MemoryStore::new();
        let user = store.insert_user("Rina", None);

        assert!(store.update_push_token(user, "tok".into()).await.unwrap());
        assert!(!store.update_push_token(999, "tok".into()).await.unwrap());
        let profile = store.find_user(user).await.unwrap().unwrap();
        assert_eq!(profile.push_token.as_deref(), Some("tok"));

        assert!(store.add_favorite(user, 5).await.unwrap());
        assert!(!store.add_favorite(user, 5).await.unwrap());
        assert!(store.is_favorite(user, 5).await.unwrap());
        assert!(store.remove_favorite(user, 5).await.unwrap());
        assert!(!store.is_favorite(user, 5).await.unwrap());
    }
}
