use utoipa::OpenApi;

use crate::logic::{CommentResponse, CreateCommentRequest, FavoriteResponse, VisitResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_comment_handler,
        crate::handlers::toggle_favorite_handler,
        crate::handlers::profile_visit_handler,
    ),
    components(
        schemas(CreateCommentRequest, CommentResponse, FavoriteResponse, VisitResponse)
    ),
    tags(
        (name = "Market", description = "Comments, wishlists and profile visits")
    ),
    servers(
        (url = "/api", description = "Preloved API")
    )
)]
pub struct MarketApiDoc;
