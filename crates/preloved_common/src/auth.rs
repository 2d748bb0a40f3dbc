//! Caller identification.
//!
//! Sessions are issued elsewhere. The gateway in front of this service
//! authenticates the client and forwards the user id in `X-User-Id`. When a
//! gateway secret is configured, requests must also carry it in
//! `X-Internal-Auth-Secret`.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use constant_time_eq::constant_time_eq;
use std::sync::Arc;
use tracing::warn;

use crate::error::{auth_error, PrelovedError};

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const INTERNAL_AUTH_HEADER: &str = "X-Internal-Auth-Secret";

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = PrelovedError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| auth_error(format!("missing {} header", USER_ID_HEADER)))?;

        let id = raw
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| auth_error(format!("invalid {} header", USER_ID_HEADER)))?;

        Ok(AuthUser { id })
    }
}

/// State for [`gateway_auth_middleware`].
#[derive(Clone, Default)]
pub struct GatewayAuthState {
    /// `None` disables the check.
    pub secret: Option<String>,
}

/// Rejects requests that do not carry the configured gateway secret.
pub async fn gateway_auth_middleware(
    State(auth_state): State<Arc<GatewayAuthState>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = auth_state.secret.as_deref() else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get(INTERNAL_AUTH_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(provided) if constant_time_eq(provided.as_bytes(), expected.as_bytes()) => {
            next.run(req).await
        }
        Some(_) => {
            warn!("Rejected request with invalid gateway secret");
            auth_error("invalid gateway credentials").into_response()
        }
        None => {
            warn!("Rejected request without {} header", INTERNAL_AUTH_HEADER);
            auth_error(format!("missing {} header", INTERNAL_AUTH_HEADER)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn whoami(user: AuthUser) -> String {
        user.id.to_string()
    }

    fn app(secret: Option<&str>) -> Router {
        let state = Arc::new(GatewayAuthState {
            secret: secret.map(str::to_string),
        });
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(state, gateway_auth_middleware))
    }

    fn request(headers: &[(&str, &str)]) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/whoami");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn extracts_user_id() {
        let response = app(None)
            .oneshot(request(&[(USER_ID_HEADER, "42")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"42");
    }

    #[tokio::test]
    async fn missing_or_bad_user_id_is_unauthorized() {
        let response = app(None).oneshot(request(&[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(None)
            .oneshot(request(&[(USER_ID_HEADER, "abc")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(None)
            .oneshot(request(&[(USER_ID_HEADER, "0")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn gateway_secret_is_enforced_when_configured() {
        let response = app(Some("s3cret"))
            .oneshot(request(&[(USER_ID_HEADER, "7")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(Some("s3cret"))
            .oneshot(request(&[(USER_ID_HEADER, "7"), (INTERNAL_AUTH_HEADER, "nope")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(Some("s3cret"))
            .oneshot(request(&[
                (USER_ID_HEADER, "7"),
                (INTERNAL_AUTH_HEADER, "s3cret"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
