//! Marketplace actions that produce notifications.
//!
//! - `POST /products/{product_id}/comments` - Comment or reply on a listing
//! - `POST /products/{product_id}/favorite` - Toggle the caller's wishlist entry
//! - `POST /users/{user_id}/visit` - Record a profile visit

#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use logic::MarketServices;
pub use routes::routes;

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::MarketApiDoc;
}
