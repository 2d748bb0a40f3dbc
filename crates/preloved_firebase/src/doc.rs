use utoipa::OpenApi;

use crate::handlers::{
    TestNotificationRequest, TestNotificationResponse, TokenStatusResponse, UpdateTokenRequest,
    UpdateTokenResponse,
};
use preloved_common::push::PushProtocol;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::update_token_handler,
        crate::handlers::token_status_handler,
        crate::handlers::test_notification_handler,
        crate::handlers::test_notification_to_user_handler,
    ),
    components(
        schemas(
            UpdateTokenRequest,
            UpdateTokenResponse,
            TokenStatusResponse,
            TestNotificationRequest,
            TestNotificationResponse,
            PushProtocol,
        )
    ),
    tags(
        (name = "Firebase", description = "Device tokens and test pushes")
    ),
    servers(
        (url = "/api", description = "Preloved API")
    )
)]
pub struct FirebaseApiDoc;
