//! Read-only catalog routes.
//!
//! GET /api/products      - Full catalog ordered by name
//! GET /api/products/{id} - Retrieve a product by ID

use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use axum::routing::get;
use axum::{Extension, Json, Router};

use crate::error::AppError;
use crate::models::{ApiResponse, Product};
use crate::store::SharedStore;

/// Build the products router.
pub fn router() -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
}

async fn list_products(
    Extension(store): Extension<SharedStore>,
) -> Result<Json<ApiResponse<Vec<Product>>>, AppError> {
    let products = store.list_products().await?;

    Ok(Json(ApiResponse {
        message: format!("{} products retrieved", products.len()),
        data: products,
    }))
}

async fn get_product(
    Extension(store): Extension<SharedStore>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let Path(id) = id?;
    let product = store
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;

    Ok(Json(ApiResponse {
        data: product,
        message: "Product retrieved".to_string(),
    }))
}
