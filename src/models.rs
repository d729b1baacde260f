//! Domain models for the cafeteria orders service.
//!
//! Row structs map to the tables created by `migrations/` and are assembled
//! into the nested [`Order`] shape that the dashboard statistics consume.
//! Money is carried as [`Decimal`] and serialized as JSON numbers.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Database Models (sqlx::FromRow)
// ============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
}

/// Id and name of a product, used to populate the dashboard product filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
}

/// An `orders` row without its lines.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i32,
    pub user_id: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
}

/// An `order_items` row joined with the product name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderLineRow {
    pub order_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

// ============================================================================
// Order Status
// ============================================================================

/// The four statuses the dashboard breaks orders down by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
    Processing,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Processing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Processing => "processing",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored status is not one of the four canonical values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// A customer order with its lines.
///
/// `status` is kept as the raw stored string: the four canonical values are
/// `pending`, `completed`, `cancelled` and `processing`, but older write paths
/// have stored other values (`accepted`) and those must survive a read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub items: Vec<OrderLine>,
}

/// One line of an order. `price` is the unit price captured when the order
/// was placed, not the product's current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OrderLine {
    /// Revenue contributed by this line.
    pub fn amount(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl Order {
    /// Attach lines to an order row. Lines belonging to other orders are ignored.
    pub fn from_rows(row: OrderRow, lines: &[OrderLineRow]) -> Self {
        let items = lines
            .iter()
            .filter(|line| line.order_id == row.id)
            .map(|line| OrderLine {
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        Self {
            id: row.id,
            user_id: row.user_id,
            status: row.status,
            created_at: row.created_at,
            items,
        }
    }
}

// ============================================================================
// Request Models (Deserialize from JSON input)
// ============================================================================

/// Request body for placing a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: i32,
    #[serde(default)]
    pub order_items: Vec<OrderItemInput>,
}

/// A single line in an order placement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
}

// ============================================================================
// Response Models
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
}

/// Body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn line(order_id: i32, product_id: i32, quantity: i32, price: Decimal) -> OrderLineRow {
        OrderLineRow {
            order_id,
            product_id,
            product_name: format!("product-{product_id}"),
            quantity,
            price,
        }
    }

    #[test]
    fn test_line_amount_uses_captured_price() {
        let line = OrderLine {
            product_id: 1,
            product_name: "Latte".to_string(),
            quantity: 3,
            price: dec!(2500.50),
        };
        assert_eq!(line.amount(), dec!(7501.50));
    }

    #[test]
    fn test_from_rows_keeps_only_matching_lines() {
        let row = OrderRow {
            id: 7,
            user_id: 1,
            status: "pending".to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        };
        let lines = vec![
            line(7, 1, 2, dec!(1000)),
            line(8, 2, 1, dec!(500)),
            line(7, 3, 1, dec!(1800)),
        ];

        let order = Order::from_rows(row, &lines);

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product_id, 1);
        assert_eq!(order.items[1].product_id, 3);
    }

    #[test]
    fn test_status_parsing_is_exact() {
        assert_eq!("pending".parse::<OrderStatus>(), Ok(OrderStatus::Pending));
        assert_eq!("processing".parse::<OrderStatus>(), Ok(OrderStatus::Processing));
        assert!("Pending".parse::<OrderStatus>().is_err());
        assert_eq!(
            "accepted".parse::<OrderStatus>(),
            Err(UnknownStatus("accepted".to_string()))
        );
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_order_serializes_price_as_number() {
        let order = Order {
            id: 1,
            user_id: 2,
            status: "completed".to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            items: vec![OrderLine {
                product_id: 4,
                product_name: "Croissant".to_string(),
                quantity: 1,
                price: dec!(1800),
            }],
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["userId"], 2);
        assert_eq!(json["items"][0]["productName"], "Croissant");
        assert_eq!(json["items"][0]["price"].as_f64(), Some(1800.0));
    }
}
