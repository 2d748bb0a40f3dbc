//! Notification dispatch for Preloved
//!
//! [`NotificationDispatcher`] turns marketplace events (comments, replies,
//! wishlists, profile visits) into a stored in-app notification plus a
//! best-effort push. The routes expose the caller's notification list.
//!
//! # API Endpoints
//!
//! - `GET /notifications` - The caller's notifications, newest first
//! - `GET /notifications/unread-count` - Number of unread notifications
//! - `PUT /notifications/{id}/read` - Mark one notification read
//! - `PUT /notifications/read-all` - Mark all notifications read
//! - `DELETE /notifications/{id}` - Delete one notification

pub mod dispatcher;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod routes;
pub mod templates;

pub use dispatcher::{
    Actor, DispatchError, DispatchOutcome, NotificationDispatcher, NotificationEvent, PushStatus,
};
pub use handlers::NotificationsState;
pub use logic::CREATED_AT_FORMAT;
pub use routes::routes;

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::NotificationsApiDoc;
}
