use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{
    test_notification_handler, test_notification_to_user_handler, token_status_handler,
    update_token_handler, FirebaseState,
};

/// Device token registration and push test endpoints.
pub fn routes(state: Arc<FirebaseState>) -> Router {
    info!(
        push_enabled = state.push.is_some(),
        "Firebase routes initialized"
    );

    Router::new()
        .route("/user/fcm-token", post(update_token_handler))
        .route("/test/fcm-token", get(token_status_handler))
        .route("/test/notification", post(test_notification_handler))
        .route(
            "/test/notification/{user_id}",
            post(test_notification_to_user_handler),
        )
        .with_state(state)
}
