// --- File: crates/preloved_notifications/src/logic.rs ---

use chrono::{DateTime, Utc};
use preloved_common::models::{NotificationKind, NotificationRecord, ProductSummary};
use preloved_common::services::CatalogLookup;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A notification as the app renders it, with display fields looked up at
/// read time. Missing or failing lookups leave the field `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotificationView {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "https://preloved.example/storage/products/lamp.jpg"))]
    pub product_image: Option<String>,
    pub comment_id: Option<i64>,
    pub comment_text: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "2025-12-22 11:24:40"))]
    pub created_at: String,
    #[cfg_attr(feature = "openapi", schema(example = "5 minutes ago"))]
    pub timestamp: String,
}

/// Absolute URL of a file on the public storage disk.
pub fn storage_url(public_base_url: &str, path: &str) -> String {
    format!(
        "{}/storage/{}",
        public_base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// "5 minutes ago" style age, relative to `now`.
pub fn humanize_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - created_at).num_seconds();
    if seconds < 1 {
        return "just now".to_string();
    }

    const UNITS: [(i64, &str); 7] = [
        (365 * 24 * 3600, "year"),
        (30 * 24 * 3600, "month"),
        (7 * 24 * 3600, "week"),
        (24 * 3600, "day"),
        (3600, "hour"),
        (60, "minute"),
        (1, "second"),
    ];
    let (size, unit) = UNITS
        .iter()
        .copied()
        .find(|(size, _)| seconds >= *size)
        .unwrap_or((1, "second"));
    let count = seconds / size;
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Builds the views for a recipient's list. Each product is looked up once.
pub async fn annotate_all(
    records: Vec<NotificationRecord>,
    catalog: &dyn CatalogLookup,
    public_base_url: &str,
    now: DateTime<Utc>,
) -> Vec<NotificationView> {
    let mut products: HashMap<i64, Option<ProductSummary>> = HashMap::new();
    let mut views = Vec::with_capacity(records.len());

    for record in records {
        let product = match record.related_product_id {
            Some(product_id) => {
                if !products.contains_key(&product_id) {
                    let found = match catalog.find_product(product_id).await {
                        Ok(found) => {
                            if found.is_none() {
                                warn!(
                                    notification_id = record.id,
                                    product_id, "Product not found for notification"
                                );
                            }
                            found
                        }
                        Err(e) => {
                            warn!(
                                notification_id = record.id,
                                product_id,
                                error = %e,
                                "Error loading product for notification"
                            );
                            None
                        }
                    };
                    products.insert(product_id, found);
                }
                products.get(&product_id).cloned().flatten()
            }
            None => None,
        };

        let comment_text = match record.related_comment_id {
            Some(comment_id) => match catalog.find_comment(comment_id).await {
                Ok(comment) => comment.map(|c| c.text),
                Err(e) => {
                    warn!(
                        notification_id = record.id,
                        comment_id,
                        error = %e,
                        "Error loading comment for notification"
                    );
                    None
                }
            },
            None => None,
        };

        views.push(NotificationView {
            id: record.id,
            kind: record.kind,
            title: record.title,
            message: record.body,
            is_read: record.is_read,
            product_id: record.related_product_id,
            product_name: product.as_ref().map(|p| p.name.clone()),
            product_image: product
                .as_ref()
                .and_then(|p| p.cover_image.as_deref())
                .map(|path| storage_url(public_base_url, path)),
            comment_id: record.related_comment_id,
            comment_text,
            created_at: record.created_at.format(CREATED_AT_FORMAT).to_string(),
            timestamp: humanize_age(record.created_at, now),
        });
    }

    views
}
