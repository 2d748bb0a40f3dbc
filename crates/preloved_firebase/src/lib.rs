//! Firebase Cloud Messaging delivery for Preloved
//!
//! Pushes go out over the FCM HTTP v1 API when a service account key is
//! configured, with the legacy server-key API as the fallback.
//!
//! # Features
//!
//! - [`PushDeliveryAdapter`]: resolves the recipient's device token and sends
//!   one v1 attempt, then at most one legacy attempt
//! - OAuth2 access tokens for v1 via `yup-oauth2`
//! - Device token registration and test push endpoints
//! - OpenAPI documentation (with the `openapi` feature)
//!
//! # API Endpoints
//!
//! - `POST /user/fcm-token` - Store the caller's device token
//! - `GET /test/fcm-token` - Token status of the caller
//! - `POST /test/notification` - Send a test push to the caller
//! - `POST /test/notification/{user_id}` - Send a test push to another user

pub mod adapter;
pub mod auth;
pub mod client;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod legacy;
pub mod routes;
pub mod service;

pub use adapter::{FcmEndpoints, PrimaryCredential, PushConfig, PushDeliveryAdapter};
pub use handlers::FirebaseState;
pub use preloved_common::push::{PushError, PushMessage, PushProtocol, PushReceipt};
pub use routes::routes;
pub use service::{build_push_adapter, push_config_from};

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::FirebaseApiDoc;
}
