use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use preloved_common::{ApiResponse, AuthUser, PrelovedError};

use crate::logic::{
    CommentResponse, CreateCommentRequest, FavoriteResponse, MarketServices, VisitResponse,
};

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/products/{product_id}/comments",
    params(("product_id" = i64, Path, description = "Product being commented on")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment stored", body = CommentResponse),
        (status = 401, description = "Caller not identified"),
        (status = 404, description = "Unknown product or parent comment"),
        (status = 422, description = "Empty or over-long comment")
    ),
    tag = "Market"
))]
pub async fn create_comment_handler(
    State(services): State<Arc<MarketServices>>,
    user: AuthUser,
    Path(product_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponse>>), PrelovedError> {
    let comment = services.post_comment(user.id, product_id, payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(comment)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/products/{product_id}/favorite",
    params(("product_id" = i64, Path, description = "Product to (un)wishlist")),
    responses(
        (status = 200, description = "New favourite state", body = FavoriteResponse),
        (status = 401, description = "Caller not identified"),
        (status = 404, description = "Unknown product")
    ),
    tag = "Market"
))]
pub async fn toggle_favorite_handler(
    State(services): State<Arc<MarketServices>>,
    user: AuthUser,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<FavoriteResponse>>, PrelovedError> {
    let state = services.toggle_favorite(user.id, product_id).await?;
    Ok(ApiResponse::ok(state))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/users/{user_id}/visit",
    params(("user_id" = i64, Path, description = "Profile being visited")),
    responses(
        (status = 200, description = "Visit recorded", body = VisitResponse),
        (status = 401, description = "Caller not identified"),
        (status = 404, description = "Unknown user")
    ),
    tag = "Market"
))]
pub async fn profile_visit_handler(
    State(services): State<Arc<MarketServices>>,
    user: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<VisitResponse>>, PrelovedError> {
    let visit = services.record_visit(user.id, user_id).await?;
    Ok(ApiResponse::ok(visit))
}
