use utoipa::OpenApi;

use crate::handlers::{DeleteResponse, MarkAllReadResponse, MarkReadResponse, UnreadCountResponse};
use crate::logic::NotificationView;
use preloved_common::models::NotificationKind;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::list_notifications_handler,
        crate::handlers::unread_count_handler,
        crate::handlers::mark_read_handler,
        crate::handlers::mark_all_read_handler,
        crate::handlers::delete_notification_handler,
    ),
    components(
        schemas(
            NotificationView,
            NotificationKind,
            UnreadCountResponse,
            MarkReadResponse,
            MarkAllReadResponse,
            DeleteResponse,
        )
    ),
    tags(
        (name = "Notifications", description = "In-app notifications of the caller")
    ),
    servers(
        (url = "/api", description = "Preloved API")
    )
)]
pub struct NotificationsApiDoc;
