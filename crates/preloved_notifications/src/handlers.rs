//! HTTP handlers for the caller's in-app notifications.
//!
//! Every handler is scoped to the authenticated caller. Marking or deleting
//! someone else's notification is indistinguishable from a missing one.

use axum::extract::{Json, Path, State};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use preloved_common::services::{CatalogLookup, NotificationStore};
use preloved_common::{ApiResponse, AuthUser, PrelovedError};

use crate::logic::{annotate_all, NotificationView};

#[derive(Clone)]
pub struct NotificationsState {
    pub store: Arc<dyn NotificationStore>,
    pub catalog: Arc<dyn CatalogLookup>,
    /// Prefix for product image links.
    pub public_base_url: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MarkReadResponse {
    /// `false` when the notification was already read or does not exist.
    pub updated: bool,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/notifications",
    responses(
        (status = 200, description = "Caller's notifications, newest first", body = [NotificationView]),
        (status = 401, description = "Caller not identified")
    ),
    tag = "Notifications"
))]
pub async fn list_notifications_handler(
    State(state): State<Arc<NotificationsState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<NotificationView>>>, PrelovedError> {
    let records = state.store.list_for_recipient(user.id).await?;
    debug!(user_id = user.id, count = records.len(), "Fetched notifications");

    let views = annotate_all(
        records,
        state.catalog.as_ref(),
        &state.public_base_url,
        Utc::now(),
    )
    .await;
    Ok(ApiResponse::ok(views))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/notifications/unread-count",
    responses(
        (status = 200, description = "Unread notifications of the caller", body = UnreadCountResponse),
        (status = 401, description = "Caller not identified")
    ),
    tag = "Notifications"
))]
pub async fn unread_count_handler(
    State(state): State<Arc<NotificationsState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UnreadCountResponse>>, PrelovedError> {
    let count = state.store.unread_count(user.id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/notifications/{id}/read",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Read flag set", body = MarkReadResponse),
        (status = 401, description = "Caller not identified")
    ),
    tag = "Notifications"
))]
pub async fn mark_read_handler(
    State(state): State<Arc<NotificationsState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MarkReadResponse>>, PrelovedError> {
    let updated = state.store.mark_read(user.id, id).await?;
    debug!(user_id = user.id, notification_id = id, updated, "Mark read");
    Ok(ApiResponse::ok(MarkReadResponse { updated }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/notifications/read-all",
    responses(
        (status = 200, description = "Number of notifications marked read", body = MarkAllReadResponse),
        (status = 401, description = "Caller not identified")
    ),
    tag = "Notifications"
))]
pub async fn mark_all_read_handler(
    State(state): State<Arc<NotificationsState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<MarkAllReadResponse>>, PrelovedError> {
    let updated = state.store.mark_all_read(user.id).await?;
    info!(user_id = user.id, updated, "Marked all notifications read");
    Ok(ApiResponse::ok(MarkAllReadResponse { updated }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/notifications/{id}",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Whether a notification was removed", body = DeleteResponse),
        (status = 401, description = "Caller not identified")
    ),
    tag = "Notifications"
))]
pub async fn delete_notification_handler(
    State(state): State<Arc<NotificationsState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteResponse>>, PrelovedError> {
    let deleted = state.store.delete(user.id, id).await?;
    info!(user_id = user.id, notification_id = id, deleted, "Delete notification");
    Ok(ApiResponse::ok(DeleteResponse { deleted }))
}
