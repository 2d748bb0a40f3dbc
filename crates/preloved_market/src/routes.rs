use axum::{routing::post, Router};
use std::sync::Arc;

use crate::handlers::{create_comment_handler, profile_visit_handler, toggle_favorite_handler};
use crate::logic::MarketServices;

pub fn routes(services: Arc<MarketServices>) -> Router {
    Router::new()
        .route(
            "/products/{product_id}/comments",
            post(create_comment_handler),
        )
        .route(
            "/products/{product_id}/favorite",
            post(toggle_favorite_handler),
        )
        .route("/users/{user_id}/visit", post(profile_visit_handler))
        .with_state(services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use preloved_common::auth::USER_ID_HEADER;
    use preloved_common::services::NotificationStore;
    use preloved_db::MemoryStore;
    use preloved_notifications::NotificationDispatcher;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(store: &Arc<MemoryStore>) -> Router {
        routes(Arc::new(MarketServices {
            catalog: store.clone(),
            market: store.clone(),
            directory: store.clone(),
            dispatcher: NotificationDispatcher::new(store.clone(), None),
        }))
    }

    fn post_as(user: i64, uri: &str, body: Option<Value>) -> HttpRequest<Body> {
        let builder = HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header(USER_ID_HEADER, user.to_string());
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn call(app: &Router, req: HttpRequest<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn comment_returns_created() {
        let store = Arc::new(MemoryStore::new());
        let owner = store.insert_user("Owner", None);
        let buyer = store.insert_user("Dina", None);
        let product = store.insert_product(owner, "Vintage Lamp", None);
        let app = app(&store);

        let (status, body) = call(
            &app,
            post_as(
                buyer,
                &format!("/products/{}/comments", product),
                Some(json!({ "comment": "Still available?" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["comment"], "Still available?");
        assert_eq!(body["data"]["user_id"], buyer);
        assert_eq!(body["data"]["parent_comment_id"], Value::Null);
        assert_eq!(store.unread_count(owner).await.unwrap(), 1);

        let (status, body) = call(
            &app,
            post_as(
                buyer,
                &format!("/products/{}/comments", product),
                Some(json!({ "comment": "" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], 422);

        let (status, _) = call(
            &app,
            post_as(buyer, "/products/9999/comments", Some(json!({ "comment": "hi" }))),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn favorite_toggles() {
        let store = Arc::new(MemoryStore::new());
        let owner = store.insert_user("Owner", None);
        let buyer = store.insert_user("Dina", None);
        let product = store.insert_product(owner, "Vintage Lamp", None);
        let app = app(&store);
        let uri = format!("/products/{}/favorite", product);

        let (status, body) = call(&app, post_as(buyer, &uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "data": { "is_favorite": true } }));
        assert_eq!(store.notification_count(), 1);

        let (_, body) = call(&app, post_as(buyer, &uri, None)).await;
        assert_eq!(body["data"]["is_favorite"], false);
        assert_eq!(store.notification_count(), 0);

        let (status, _) = call(&app, post_as(buyer, "/products/9999/favorite", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn visit_requires_known_profile() {
        let store = Arc::new(MemoryStore::new());
        let owner = store.insert_user("Owner", None);
        let visitor = store.insert_user("Dina", None);
        let app = app(&store);

        let (status, body) =
            call(&app, post_as(visitor, &format!("/users/{}/visit", owner), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["notified"], true);

        let (status, _) = call(&app, post_as(visitor, "/users/9999/visit", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
