//! Order placement and history routes.
//!
//! POST /api/orders      - Place an order (status=pending, stock decremented)
//! GET  /api/orders      - List all orders with their lines, newest first
//! GET  /api/orders/{id} - Retrieve an order by ID

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{ApiResponse, CreateOrderRequest, Order};
use crate::stats::StatsFilter;
use crate::store::SharedStore;

/// Build the orders router.
pub fn router() -> Router {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}", get(get_order))
}

/// `order_items.price` is NUMERIC(12, 2).
const PRICE_SCALE: u32 = 2;
const PRICE_DIGITS: u32 = 10;

/// Whether `price` is storable in `order_items.price` without rounding.
fn price_fits_column(price: Decimal) -> bool {
    let max = Decimal::from(10_i64.pow(PRICE_DIGITS));
    price.normalize().scale() <= PRICE_SCALE && price.abs() < max
}

/// Reject requests the store should never see.
fn validate_order(req: &CreateOrderRequest) -> Result<(), AppError> {
    if req.user_id <= 0 {
        return Err(AppError::BadRequest("userId is required".to_string()));
    }
    if req.order_items.is_empty() {
        return Err(AppError::BadRequest("orderItems cannot be empty".to_string()));
    }
    for item in &req.order_items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest(format!(
                "Invalid quantity {} for product {}",
                item.quantity, item.product_id
            )));
        }
        if item.price.is_sign_negative() || !price_fits_column(item.price) {
            return Err(AppError::BadRequest(format!(
                "Invalid price {} for product {}",
                item.price, item.product_id
            )));
        }
    }
    Ok(())
}

/// Place a new order.
///
/// 1. Validate the request shape
/// 2. Check the user, products and stock, insert the order and its lines and
///    decrement stock in one transaction
/// 3. Return the created order
async fn create_order(
    Extension(store): Extension<SharedStore>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), AppError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Rejected order body: {}", rejection.body_text());
        AppError::from(rejection)
    })?;
    if let Err(e) = validate_order(&req) {
        warn!("Rejected order for user {}: {}", req.user_id, e);
        return Err(e);
    }

    let order = store.create_order(&req).await?;
    info!(
        "Order {} created for user {} with {} lines",
        order.id,
        order.user_id,
        order.items.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: order,
            message: "Order created successfully".to_string(),
        }),
    ))
}

/// List every order.
async fn list_orders(
    Extension(store): Extension<SharedStore>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    let orders = store.list_orders(&StatsFilter::default()).await?;

    Ok(Json(ApiResponse {
        message: format!("{} orders retrieved", orders.len()),
        data: orders,
    }))
}

/// Retrieve an order by ID.
async fn get_order(
    Extension(store): Extension<SharedStore>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let Path(id) = id?;
    let order = store
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(ApiResponse {
        data: order,
        message: "Order retrieved".to_string(),
    }))
}
