//! Storage for the Preloved backend
//!
//! Two interchangeable backends implement the store traits from
//! `preloved_common::services`:
//!
//! - SQL repositories over an `sqlx::Any` pool (SQLite by default, Postgres
//!   and MySQL behind features)
//! - [`MemoryStore`], used when no database is configured and in tests
//!
//! # Example
//!
//! ```rust,no_run
//! use preloved_db::{DbClientFactory, RepositoryFactory, SqlNotificationRepository, SqlRepositoryFactory};
//!
//! async fn setup() -> Result<SqlNotificationRepository, preloved_db::error::DbError> {
//!     let client = DbClientFactory::new().from_url("sqlite://data/preloved.db").await?;
//!     Ok(SqlRepositoryFactory::new().create_repository(client))
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod memory;
pub mod repositories;
pub mod repository;
pub mod schema;

pub use client::DbClient;
pub use error::DbError;
pub use factory::DbClientFactory;
pub use memory::MemoryStore;
pub use repository::RepositoryFactory;

pub use repositories::{
    SqlCatalogRepository, SqlMarketRepository, SqlNotificationRepository, SqlRepositoryFactory,
    SqlUserDirectory,
};
