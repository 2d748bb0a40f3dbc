// Shared building blocks for the Preloved backend crates: models, errors,
// HTTP helpers, caller authentication, logging and the service traits that
// decouple handlers from storage and push delivery.

pub mod auth;
pub mod error;
pub mod features;
pub mod http;
pub mod logging;
pub mod models;
pub mod push;
pub mod services;

pub use error::{
    auth_error, bad_request, config_error, external_service_error, internal_error, not_found,
    validation_error, HttpStatusCode, PrelovedError,
};

pub use http::{client::create_client, ApiResponse, IntoHttpResponse};

pub use auth::{gateway_auth_middleware, AuthUser, GatewayAuthState};

pub use logging::{init, init_with_level, log_result};

pub use features::{is_feature_enabled, is_firebase_enabled};
