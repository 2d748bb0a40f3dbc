use axum::{
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    delete_notification_handler, list_notifications_handler, mark_all_read_handler,
    mark_read_handler, unread_count_handler, NotificationsState,
};

pub fn routes(state: Arc<NotificationsState>) -> Router {
    Router::new()
        .route("/notifications", get(list_notifications_handler))
        .route("/notifications/unread-count", get(unread_count_handler))
        .route("/notifications/read-all", put(mark_all_read_handler))
        .route("/notifications/{id}/read", put(mark_read_handler))
        .route("/notifications/{id}", delete(delete_notification_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Actor, NotificationDispatcher, NotificationEvent};
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use preloved_common::auth::USER_ID_HEADER;
    use preloved_common::services::NotificationStore;
    use preloved_db::MemoryStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct Fixture {
        store: Arc<MemoryStore>,
        app: Router,
        owner: i64,
        product: i64,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let owner = store.insert_user("Owner", None);
        let product = store.insert_product(owner, "Vintage Lamp", Some("products/lamp.jpg"));

        let dispatcher = NotificationDispatcher::new(store.clone(), None);
        for actor in [100, 101, 102] {
            dispatcher
                .dispatch(NotificationEvent::Wishlist {
                    actor: Actor::new(actor, format!("User {actor}")),
                    recipient_id: owner,
                    product_id: product,
                    product_name: "Vintage Lamp".to_string(),
                })
                .await
                .unwrap();
        }

        let app = routes(Arc::new(NotificationsState {
            store: store.clone(),
            catalog: store.clone(),
            public_base_url: "https://preloved.example".to_string(),
        }));
        Fixture {
            store,
            app,
            owner,
            product,
        }
    }

    fn request(method: &str, uri: &str, user: i64) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method(method)
            .uri(uri)
            .header(USER_ID_HEADER, user.to_string())
            .body(Body::empty())
            .unwrap()
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
    async fn list_is_annotated_and_newest_first() {
        let f = fixture().await;
        let (status, body) = call(&f.app, request("GET", "/notifications", f.owner)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let items = body["data"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["message"], "User 102 added \"Vintage Lamp\" to wishlist");
        assert_eq!(items[0]["type"], "wishlist");
        assert_eq!(items[0]["product_id"], f.product);
        assert_eq!(items[0]["product_name"], "Vintage Lamp");
        assert_eq!(
            items[0]["product_image"],
            "https://preloved.example/storage/products/lamp.jpg"
        );
        assert_eq!(items[0]["comment_text"], Value::Null);
        assert_eq!(items[0]["is_read"], false);

        let (_, body) = call(&f.app, request("GET", "/notifications", 100)).await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn read_flags_and_unread_count() {
        let f = fixture().await;
        let ids: Vec<i64> = f
            .store
            .list_for_recipient(f.owner)
            .await
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();

        let (_, body) = call(&f.app, request("GET", "/notifications/unread-count", f.owner)).await;
        assert_eq!(body, json!({ "success": true, "data": { "count": 3 } }));

        let uri = format!("/notifications/{}/read", ids[0]);
        let (status, body) = call(&f.app, request("PUT", &uri, f.owner)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["updated"], true);

        // repeat and foreign reads are no-ops, not errors
        let (status, body) = call(&f.app, request("PUT", &uri, f.owner)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["updated"], false);
        let uri = format!("/notifications/{}/read", ids[1]);
        let (_, body) = call(&f.app, request("PUT", &uri, 100)).await;
        assert_eq!(body["data"]["updated"], false);

        let (_, body) = call(&f.app, request("PUT", "/notifications/read-all", f.owner)).await;
        assert_eq!(body["data"]["updated"], 2);

        let (_, body) = call(&f.app, request("GET", "/notifications/unread-count", f.owner)).await;
        assert_eq!(body["data"]["count"], 0);
    }

    #[tokio::test]
    async fn delete_is_scoped_to_the_caller() {
        let f = fixture().await;
        let id = f.store.list_for_recipient(f.owner).await.unwrap()[0].id;
        let uri = format!("/notifications/{}", id);

        let (_, body) = call(&f.app, request("DELETE", &uri, 100)).await;
        assert_eq!(body["data"]["deleted"], false);
        assert_eq!(f.store.notification_count(), 3);

        let (status, body) = call(&f.app, request("DELETE", &uri, f.owner)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deleted"], true);
        assert_eq!(f.store.notification_count(), 2);
    }

    #[tokio::test]
    async fn requests_without_a_caller_are_rejected() {
        let f = fixture().await;
        let req = HttpRequest::builder()
            .uri("/notifications")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(&f.app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], 401);
    }
}
