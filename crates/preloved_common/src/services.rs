//! Service abstractions.
//!
//! Handlers and the dispatcher only see these traits. `preloved-db` provides
//! SQL and in-memory implementations of the store traits; `preloved-firebase`
//! provides the push sender. Trait objects are shared as `Arc<dyn ...>`.

use crate::error::PrelovedError;
use crate::models::{
    CommentSummary, NewComment, NewNotification, NotificationRecord, ProductSummary, UserProfile,
};
use crate::push::{PushError, PushMessage, PushReceipt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Persistence for in-app notifications.
///
/// Every read and mutation is scoped to one recipient; there is no
/// cross-user access.
pub trait NotificationStore: Send + Sync {
    fn create(
        &self,
        notification: NewNotification,
    ) -> BoxFuture<'_, NotificationRecord, PrelovedError>;

    /// Newest first (`created_at DESC, id DESC`).
    fn list_for_recipient(
        &self,
        user_id: i64,
    ) -> BoxFuture<'_, Vec<NotificationRecord>, PrelovedError>;

    /// Returns `false` when nothing matched.
    fn mark_read(&self, user_id: i64, notification_id: i64) -> BoxFuture<'_, bool, PrelovedError>;

    /// Returns the number of records flipped from unread to read.
    fn mark_all_read(&self, user_id: i64) -> BoxFuture<'_, u64, PrelovedError>;

    fn unread_count(&self, user_id: i64) -> BoxFuture<'_, i64, PrelovedError>;

    fn delete(&self, user_id: i64, notification_id: i64) -> BoxFuture<'_, bool, PrelovedError>;

    /// Wishlist records for `(recipient, product)`, newest first.
    fn find_wishlist(
        &self,
        recipient_id: i64,
        product_id: i64,
    ) -> BoxFuture<'_, Vec<NotificationRecord>, PrelovedError>;
}

/// Read access to user accounts plus the device-token column.
pub trait UserDirectory: Send + Sync {
    fn find_user(&self, user_id: i64) -> BoxFuture<'_, Option<UserProfile>, PrelovedError>;

    /// Replaces the user's token. Returns `false` for an unknown user.
    fn update_push_token(
        &self,
        user_id: i64,
        token: String,
    ) -> BoxFuture<'_, bool, PrelovedError>;
}

/// Read access to listings and their comments.
pub trait CatalogLookup: Send + Sync {
    fn find_product(&self, product_id: i64)
        -> BoxFuture<'_, Option<ProductSummary>, PrelovedError>;

    fn find_comment(&self, comment_id: i64)
        -> BoxFuture<'_, Option<CommentSummary>, PrelovedError>;
}

/// Writes behind the marketplace actions that produce notifications.
pub trait MarketStore: Send + Sync {
    fn create_comment(&self, comment: NewComment) -> BoxFuture<'_, CommentSummary, PrelovedError>;

    fn is_favorite(&self, user_id: i64, product_id: i64) -> BoxFuture<'_, bool, PrelovedError>;

    /// Returns `false` if the favourite already existed.
    fn add_favorite(&self, user_id: i64, product_id: i64) -> BoxFuture<'_, bool, PrelovedError>;

    /// Returns `false` if there was nothing to remove.
    fn remove_favorite(&self, user_id: i64, product_id: i64)
        -> BoxFuture<'_, bool, PrelovedError>;
}

/// Sends a push to a user's registered device.
pub trait PushSender: Send + Sync {
    fn push(&self, message: PushMessage) -> BoxFuture<'_, PushReceipt, PushError>;
}

/// Access to the service instances the backend was started with.
pub trait ServiceFactory: Send + Sync {
    fn notification_store(&self) -> Arc<dyn NotificationStore>;

    fn user_directory(&self) -> Arc<dyn UserDirectory>;

    fn catalog(&self) -> Arc<dyn CatalogLookup>;

    fn market_store(&self) -> Arc<dyn MarketStore>;

    /// `None` when push delivery is disabled.
    fn push_sender(&self) -> Option<Arc<dyn PushSender>>;
}
