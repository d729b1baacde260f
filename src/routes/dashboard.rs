//! Dashboard routes.
//!
//! GET /api/dashboard/stats    - Aggregate order statistics (`date`, `status`, `productId` filters)
//! GET /api/dashboard/products - Product ids and names for the filter dropdown

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::error::AppError;
use crate::models::ProductSummary;
use crate::stats::{compute_stats, StatsFilter, StatsSummary};
use crate::store::SharedStore;

/// Build the dashboard router.
pub fn router() -> Router {
    Router::new()
        .route("/api/dashboard/stats", get(get_stats))
        .route("/api/dashboard/products", get(list_filter_products))
}

/// Raw query string of the stats endpoint. Empty values mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub date: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
}

impl StatsQuery {
    /// Validate the query into a [`StatsFilter`].
    pub fn into_filter(self) -> Result<StatsFilter, AppError> {
        let day = non_empty(self.date)
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|_| AppError::BadRequest(format!("Invalid date: {raw}")))
            })
            .transpose()?;

        let product_id = non_empty(self.product_id)
            .map(|raw| {
                raw.parse::<i32>()
                    .map_err(|_| AppError::BadRequest(format!("Invalid productId: {raw}")))
            })
            .transpose()?;

        Ok(StatsFilter {
            status: non_empty(self.status),
            day,
            product_id,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Compute dashboard statistics over the orders matching the query.
async fn get_stats(
    Extension(store): Extension<SharedStore>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<StatsSummary>, AppError> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let orders = store.list_orders(&filter).await?;
    let summary = compute_stats(&orders, &filter);

    debug!(
        "Stats for {:?}: {} orders, revenue {}",
        filter, summary.total_orders, summary.total_revenue
    );

    Ok(Json(summary))
}

/// List product ids and names.
async fn list_filter_products(
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Vec<ProductSummary>>, AppError> {
    Ok(Json(store.list_product_summaries().await?))
}
