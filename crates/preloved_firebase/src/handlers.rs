//! HTTP handlers for device registration and test pushes.

use axum::extract::{Json, Path, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use preloved_common::push::{PushError, PushMessage, PushProtocol};
use preloved_common::services::{PushSender, UserDirectory};
use preloved_common::{
    bad_request, config_error, external_service_error, not_found, validation_error, ApiResponse,
    AuthUser, PrelovedError,
};

/// Characters of the token shown by the status endpoint.
const TOKEN_PREVIEW_LEN: usize = 30;

#[derive(Clone)]
pub struct FirebaseState {
    pub directory: Arc<dyn UserDirectory>,
    /// `None` when push delivery is disabled.
    pub push: Option<Arc<dyn PushSender>>,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateTokenRequest {
    /// Device registration token issued by the Firebase SDK
    pub fcm_token: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateTokenResponse {
    pub updated: bool,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenStatusResponse {
    pub user_id: i64,
    pub has_fcm_token: bool,
    pub fcm_token_preview: Option<String>,
    pub token_length: usize,
}

#[derive(Debug, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TestNotificationRequest {
    pub title: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TestNotificationResponse {
    pub user_id: i64,
    pub protocol: PushProtocol,
    pub message_id: Option<String>,
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/user/fcm-token",
    request_body = UpdateTokenRequest,
    responses(
        (status = 200, description = "Token stored", body = UpdateTokenResponse),
        (status = 401, description = "Caller not identified"),
        (status = 404, description = "Unknown user"),
        (status = 422, description = "Empty token")
    ),
    tag = "Firebase"
))]
pub async fn update_token_handler(
    State(state): State<Arc<FirebaseState>>,
    user: AuthUser,
    Json(payload): Json<UpdateTokenRequest>,
) -> Result<Json<ApiResponse<UpdateTokenResponse>>, PrelovedError> {
    let token = payload.fcm_token.trim();
    if token.is_empty() {
        return Err(validation_error("fcm_token must not be empty"));
    }

    if !state
        .directory
        .update_push_token(user.id, token.to_string())
        .await?
    {
        return Err(not_found(format!("User {} not found", user.id)));
    }

    info!(user_id = user.id, token_length = token.len(), "Device token updated");
    Ok(ApiResponse::ok(UpdateTokenResponse { updated: true }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/test/fcm-token",
    responses(
        (status = 200, description = "Token status of the caller", body = TokenStatusResponse),
        (status = 401, description = "Caller not identified"),
        (status = 404, description = "Unknown user")
    ),
    tag = "Firebase"
))]
pub async fn token_status_handler(
    State(state): State<Arc<FirebaseState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<TokenStatusResponse>>, PrelovedError> {
    let profile = state
        .directory
        .find_user(user.id)
        .await?
        .ok_or_else(|| not_found(format!("User {} not found", user.id)))?;

    let token = profile.push_token.unwrap_or_default();
    Ok(ApiResponse::ok(TokenStatusResponse {
        user_id: user.id,
        has_fcm_token: !token.is_empty(),
        fcm_token_preview: (!token.is_empty())
            .then(|| token.chars().take(TOKEN_PREVIEW_LEN).collect()),
        token_length: token.len(),
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/test/notification",
    request_body = TestNotificationRequest,
    responses(
        (status = 200, description = "Push accepted by FCM", body = TestNotificationResponse),
        (status = 400, description = "Caller has no device token"),
        (status = 502, description = "Delivery failed")
    ),
    tag = "Firebase"
))]
pub async fn test_notification_handler(
    State(state): State<Arc<FirebaseState>>,
    user: AuthUser,
    payload: Option<Json<TestNotificationRequest>>,
) -> Result<Json<ApiResponse<TestNotificationResponse>>, PrelovedError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    send_test_push(&state, user.id, payload).await
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/test/notification/{user_id}",
    params(("user_id" = i64, Path, description = "Recipient")),
    request_body = TestNotificationRequest,
    responses(
        (status = 200, description = "Push accepted by FCM", body = TestNotificationResponse),
        (status = 400, description = "Recipient has no device token"),
        (status = 404, description = "Unknown user"),
        (status = 502, description = "Delivery failed")
    ),
    tag = "Firebase"
))]
pub async fn test_notification_to_user_handler(
    State(state): State<Arc<FirebaseState>>,
    _caller: AuthUser,
    Path(user_id): Path<i64>,
    payload: Option<Json<TestNotificationRequest>>,
) -> Result<Json<ApiResponse<TestNotificationResponse>>, PrelovedError> {
    if state.directory.find_user(user_id).await?.is_none() {
        return Err(not_found(format!("User {} not found", user_id)));
    }
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    send_test_push(&state, user_id, payload).await
}

async fn send_test_push(
    state: &FirebaseState,
    user_id: i64,
    payload: TestNotificationRequest,
) -> Result<Json<ApiResponse<TestNotificationResponse>>, PrelovedError> {
    let Some(push) = state.push.as_ref() else {
        return Err(config_error("push delivery is disabled"));
    };

    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Test notification".to_string());
    let body = payload
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "This is a test push from Preloved".to_string());

    let message = PushMessage::new(user_id, title, body)
        .with_data("type", "test")
        .with_data("test_id", Utc::now().timestamp().to_string());

    match push.push(message).await {
        Ok(receipt) => {
            info!(recipient_id = user_id, protocol = %receipt.protocol, "Test push delivered");
            Ok(ApiResponse::ok(TestNotificationResponse {
                user_id,
                protocol: receipt.protocol,
                message_id: receipt.message_id,
            }))
        }
        Err(e @ PushError::NoDeviceToken { .. }) => Err(bad_request(e)),
        Err(e) => {
            warn!(recipient_id = user_id, error = %e, "Test push failed");
            Err(external_service_error("fcm", e))
        }
    }
}
