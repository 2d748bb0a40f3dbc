//! Router assembly for the Preloved backend.
//!
//! Every feature crate contributes a router; they are merged and nested
//! under `/api` behind the gateway check and a trace layer.

pub mod app_state;
pub mod service_factory;

use axum::{middleware, routing::get, Router};
use preloved_common::{gateway_auth_middleware, GatewayAuthState};
use preloved_firebase::FirebaseState;
use preloved_market::MarketServices;
use preloved_notifications::{NotificationDispatcher, NotificationsState};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app_state::AppState;

/// Builds the full application router.
pub fn build_app(state: &AppState) -> Router {
    let services = &state.service_factory;
    let push = services.push_sender();
    let dispatcher = NotificationDispatcher::new(services.notification_store(), push.clone());

    let notifications = preloved_notifications::routes(Arc::new(NotificationsState {
        store: services.notification_store(),
        catalog: services.catalog(),
        public_base_url: state.config.storage.public_base_url.clone(),
    }));
    let market = preloved_market::routes(Arc::new(MarketServices {
        catalog: services.catalog(),
        market: services.market_store(),
        directory: services.user_directory(),
        dispatcher,
    }));
    let firebase = preloved_firebase::routes(Arc::new(FirebaseState {
        directory: services.user_directory(),
        push,
    }));

    let gateway = Arc::new(GatewayAuthState {
        secret: state
            .config
            .auth
            .as_ref()
            .and_then(|auth| auth.gateway_secret.clone())
            .filter(|secret| !secret.is_empty()),
    });
    if gateway.secret.is_none() {
        info!("No gateway secret configured; trusting X-User-Id as forwarded");
    }

    let api = Router::new()
        .route("/", get(|| async { "Welcome to the Preloved API!" }))
        .merge(notifications)
        .merge(market)
        .merge(firebase)
        .layer(middleware::from_fn_with_state(gateway, gateway_auth_middleware));

    #[allow(unused_mut)]
    let mut app = Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http());

    #[cfg(feature = "openapi")]
    {
        use preloved_firebase::openapi::FirebaseApiDoc;
        use preloved_market::openapi::MarketApiDoc;
        use preloved_notifications::openapi::NotificationsApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Preloved API",
                version = "0.1.0",
                description = "Notifications, marketplace events and push delivery"
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(NotificationsApiDoc::openapi());
        openapi_doc.merge(MarketApiDoc::openapi());
        openapi_doc.merge(FirebaseApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    app
}
