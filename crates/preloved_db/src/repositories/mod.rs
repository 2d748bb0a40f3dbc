//! SQL repositories.
//!
//! Each repository has inherent async methods returning [`DbError`] and
//! implements the matching `preloved_common::services` trait on top of them.

use crate::error::DbError;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::AnyRow;
use sqlx::{Any, Decode, Row};

pub mod catalog_sql;
pub mod factory;
pub mod market_sql;
pub mod notification_sql;
pub mod user_directory_sql;

pub use catalog_sql::SqlCatalogRepository;
pub use factory::SqlRepositoryFactory;
pub use market_sql::SqlMarketRepository;
pub use notification_sql::SqlNotificationRepository;
pub use user_directory_sql::SqlUserDirectory;

// The Any driver has no chrono support, so timestamps are fixed-width
// RFC 3339 text. Fixed width keeps ORDER BY on the column chronological.
pub(crate) fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DbError::DecodeError(format!("invalid timestamp '{}': {}", raw, e)))
}

// `AnyRow::try_get` type-checks before the NULL test, and a NULL cell reports
// SQL type NULL, which no Rust type is compatible with. Nullable columns go
// through `Option`'s own decode instead, which maps NULL to `None`.
pub(crate) fn nullable<'r, T>(row: &'r AnyRow, column: &str) -> Result<Option<T>, DbError>
where
    T: Decode<'r, Any>,
{
    Ok(row.try_get_unchecked::<Option<T>, _>(column)?)
}
