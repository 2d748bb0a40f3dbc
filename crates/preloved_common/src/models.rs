use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What triggered a notification.
///
/// Stored as its snake_case name in the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Comment,
    Reply,
    Wishlist,
    ProfileVisit,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Comment => "comment",
            NotificationKind::Reply => "reply",
            NotificationKind::Wishlist => "wishlist",
            NotificationKind::ProfileVisit => "profile_visit",
            NotificationKind::System => "system",
        }
    }

    /// Parses a stored kind. Unknown values read back as `System`.
    pub fn from_db(value: &str) -> Self {
        match value {
            "comment" => NotificationKind::Comment,
            "reply" => NotificationKind::Reply,
            "wishlist" => NotificationKind::Wishlist,
            "profile_visit" => NotificationKind::ProfileVisit,
            _ => NotificationKind::System,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted in-app notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotificationRecord {
    pub id: i64,
    pub recipient_user_id: i64,
    /// The user whose action produced this record. `None` for system
    /// messages and rows written before actors were tracked.
    pub actor_user_id: Option<i64>,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub related_product_id: Option<i64>,
    pub related_comment_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for `NotificationStore::create`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub recipient_user_id: i64,
    pub actor_user_id: Option<i64>,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub related_product_id: Option<i64>,
    pub related_comment_id: Option<i64>,
}

/// The part of a user account this backend reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub display_name: String,
    /// The single registered device token, if any.
    pub push_token: Option<String>,
}

/// The part of a product listing this backend reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    /// Storage path of the cover image: first gallery image by sort order,
    /// falling back to the listing's single image column.
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CommentSummary {
    pub id: i64,
    pub product_id: i64,
    pub author_id: i64,
    pub text: String,
    pub parent_comment_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Input for `MarketStore::create_comment`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub product_id: i64,
    pub author_id: i64,
    pub text: String,
    pub parent_comment_id: Option<i64>,
}
