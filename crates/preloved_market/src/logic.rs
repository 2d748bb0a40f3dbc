//! The marketplace actions behind the market routes.
//!
//! Each action performs its own write first and only then notifies. A failed
//! notification never fails the action.

use preloved_common::models::{CommentSummary, NewComment, ProductSummary};
use preloved_common::services::{CatalogLookup, MarketStore, UserDirectory};
use preloved_common::{not_found, validation_error, PrelovedError};
use preloved_notifications::{
    Actor, DispatchOutcome, NotificationDispatcher, NotificationEvent, CREATED_AT_FORMAT,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub const MAX_COMMENT_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateCommentRequest {
    #[cfg_attr(feature = "openapi", schema(example = "Is this still available?"))]
    pub comment: String,
    /// Set to reply to an existing comment on the same product.
    pub parent_comment_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CommentResponse {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub comment: String,
    pub parent_comment_id: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FavoriteResponse {
    pub is_favorite: bool,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VisitResponse {
    /// Whether the profile owner got a notification.
    pub notified: bool,
}

/// Collaborators every market action needs.
#[derive(Clone)]
pub struct MarketServices {
    pub catalog: Arc<dyn CatalogLookup>,
    pub market: Arc<dyn MarketStore>,
    pub directory: Arc<dyn UserDirectory>,
    pub dispatcher: NotificationDispatcher,
}

impl MarketServices {
    /// Resolves the acting user's display name. A failed lookup leaves it blank.
    async fn actor(&self, user_id: i64) -> Actor {
        let name = match self.directory.find_user(user_id).await {
            Ok(Some(user)) => user.display_name,
            Ok(None) => String::new(),
            Err(e) => {
                debug!(user_id, error = %e, "Actor lookup failed");
                String::new()
            }
        };
        Actor::new(user_id, name)
    }

    async fn product(&self, product_id: i64) -> Result<ProductSummary, PrelovedError> {
        self.catalog
            .find_product(product_id)
            .await?
            .ok_or_else(|| not_found(format!("Product {} not found", product_id)))
    }

    /// Stores a comment or reply and notifies the owner or parent author.
    ///
    /// # Errors
    ///
    /// * Validation error for an empty or over-long comment
    /// * Not found for an unknown product, or a parent that is not on it
    pub async fn post_comment(
        &self,
        author_id: i64,
        product_id: i64,
        request: CreateCommentRequest,
    ) -> Result<CommentResponse, PrelovedError> {
        let text = request.comment.trim();
        if text.is_empty() {
            return Err(validation_error("comment must not be empty"));
        }
        if text.chars().count() > MAX_COMMENT_CHARS {
            return Err(validation_error(format!(
                "comment must be at most {} characters",
                MAX_COMMENT_CHARS
            )));
        }

        let product = self.product(product_id).await?;
        let parent = match request.parent_comment_id {
            Some(parent_id) => Some(self.parent_comment(parent_id, product_id).await?),
            None => None,
        };

        let comment = self
            .market
            .create_comment(NewComment {
                product_id,
                author_id,
                text: text.to_string(),
                parent_comment_id: parent.as_ref().map(|p| p.id),
            })
            .await?;
        info!(
            comment_id = comment.id,
            product_id,
            author_id,
            is_reply = parent.is_some(),
            "Comment stored"
        );

        let actor = self.actor(author_id).await;
        let event = match &parent {
            Some(parent) => NotificationEvent::Reply {
                actor: actor.clone(),
                recipient_id: parent.author_id,
                product_id,
                comment_id: comment.id,
            },
            None => NotificationEvent::Comment {
                actor: actor.clone(),
                recipient_id: product.owner_id,
                product_id,
                comment_id: comment.id,
            },
        };
        self.dispatcher.notify(event).await;

        Ok(CommentResponse {
            id: comment.id,
            product_id: comment.product_id,
            user_id: comment.author_id,
            user_name: actor.name().to_string(),
            comment: comment.text,
            parent_comment_id: comment.parent_comment_id,
            created_at: comment.created_at.format(CREATED_AT_FORMAT).to_string(),
        })
    }

    async fn parent_comment(
        &self,
        parent_id: i64,
        product_id: i64,
    ) -> Result<CommentSummary, PrelovedError> {
        self.catalog
            .find_comment(parent_id)
            .await?
            .filter(|c| c.product_id == product_id)
            .ok_or_else(|| {
                not_found(format!(
                    "Parent comment {} not found on product {}",
                    parent_id, product_id
                ))
            })
    }

    /// Flips the caller's favourite and notifies or retracts accordingly.
    ///
    /// # Errors
    ///
    /// Not found for an unknown product.
    pub async fn toggle_favorite(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<FavoriteResponse, PrelovedError> {
        let product = self.product(product_id).await?;

        if self.market.is_favorite(user_id, product_id).await? {
            self.market.remove_favorite(user_id, product_id).await?;
            info!(user_id, product_id, "Removed from wishlist");
            self.dispatcher
                .retract_wishlist_quietly(user_id, product.owner_id, product_id)
                .await;
            return Ok(FavoriteResponse { is_favorite: false });
        }

        // a concurrent insert of the same pair is absorbed by the unique key
        if self.market.add_favorite(user_id, product_id).await? {
            info!(user_id, product_id, "Added to wishlist");
            let actor = self.actor(user_id).await;
            self.dispatcher
                .notify(NotificationEvent::Wishlist {
                    actor,
                    recipient_id: product.owner_id,
                    product_id,
                    product_name: product.name,
                })
                .await;
        }
        Ok(FavoriteResponse { is_favorite: true })
    }

    /// Notifies a profile owner of a visit.
    ///
    /// # Errors
    ///
    /// Not found for an unknown profile.
    pub async fn record_visit(
        &self,
        visitor_id: i64,
        profile_id: i64,
    ) -> Result<VisitResponse, PrelovedError> {
        if self.directory.find_user(profile_id).await?.is_none() {
            return Err(not_found(format!("User {} not found", profile_id)));
        }

        let actor = self.actor(visitor_id).await;
        let outcome = self
            .dispatcher
            .notify(NotificationEvent::ProfileVisit {
                actor,
                recipient_id: profile_id,
            })
            .await;
        Ok(VisitResponse {
            notified: matches!(outcome, Some(DispatchOutcome::Delivered { .. })),
        })
    }
}
