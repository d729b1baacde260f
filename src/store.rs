//! Storage for catalog products and orders.
//!
//! [`CafeteriaStore`] is the seam between the HTTP layer and persistence.
//! [`PgStore`] implements it over the application pool; integration tests
//! substitute an in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::db::AppDb;
use crate::models::{
    CreateOrderRequest, Order, OrderLine, OrderLineRow, OrderRow, OrderStatus, Product,
    ProductSummary,
};
use crate::stats::StatsFilter;

/// Shared handle injected into handlers as an Axum extension.
pub type SharedStore = Arc<dyn CafeteriaStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("Product {0} not found")]
    ProductNotFound(i32),

    #[error("Insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: i64,
        available: i32,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait CafeteriaStore: Send + Sync {
    /// Orders with their lines, newest first.
    ///
    /// Implementations may apply any part of `filter`; callers that need exact
    /// filter semantics run the result through [`crate::stats::compute_stats`].
    async fn list_orders(&self, filter: &StatsFilter) -> Result<Vec<Order>, StoreError>;

    async fn get_order(&self, id: i32) -> Result<Option<Order>, StoreError>;

    /// Place an order with status `pending` and decrement product stock.
    ///
    /// Fails without side effects when the user or a product is missing, or
    /// when the combined quantity for a product exceeds its stock.
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, StoreError>;

    /// Full catalog ordered by name.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn get_product(&self, id: i32) -> Result<Option<Product>, StoreError>;

    /// Id and name of every product, ordered by id.
    async fn list_product_summaries(&self) -> Result<Vec<ProductSummary>, StoreError>;
}

/// Total requested quantity per product, in first-seen order.
///
/// Summed as `i64` so repeated lines cannot overflow the `i32` stock column.
pub fn requested_quantities(request: &CreateOrderRequest) -> Vec<(i32, i64)> {
    let mut totals: Vec<(i32, i64)> = Vec::new();
    for item in &request.order_items {
        let quantity = i64::from(item.quantity);
        match totals.iter_mut().find(|(id, _)| *id == item.product_id) {
            Some((_, qty)) => *qty += quantity,
            None => totals.push((item.product_id, quantity)),
        }
    }
    totals
}

// ============================================================================
// PostgreSQL
// ============================================================================

pub struct PgStore {
    pool: AppDb,
}

impl PgStore {
    pub fn new(pool: AppDb) -> Self {
        Self { pool }
    }

    async fn load_lines(&self, order_ids: &[i32]) -> Result<Vec<OrderLineRow>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT oi.order_id, oi.product_id, p.name AS product_name, oi.quantity, oi.price
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl CafeteriaStore for PgStore {
    async fn list_orders(&self, filter: &StatsFilter) -> Result<Vec<Order>, StoreError> {
        let (start, end) = match filter.day_range() {
            Some((start, end)) => (Some(start), end),
            None => (None, None),
        };

        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT o.id, o.user_id, o.status, o.created_at
            FROM orders o
            WHERE ($1::text IS NULL OR o.status = $1)
              AND ($2::timestamp IS NULL OR o.created_at >= $2)
              AND ($3::timestamp IS NULL OR o.created_at < $3)
              AND ($4::int4 IS NULL OR EXISTS (
                    SELECT 1 FROM order_items oi
                    WHERE oi.order_id = o.id AND oi.product_id = $4))
            ORDER BY o.created_at DESC, o.id DESC
            "#,
        )
        .bind(filter.status())
        .bind(start)
        .bind(end)
        .bind(filter.product_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let lines = self.load_lines(&ids).await?;

        let mut by_order: HashMap<i32, Vec<OrderLineRow>> = HashMap::new();
        for line in lines {
            by_order.entry(line.order_id).or_default().push(line);
        }

        debug!("Loaded {} orders for {:?}", rows.len(), filter);

        Ok(rows
            .into_iter()
            .map(|row| {
                let lines = by_order.remove(&row.id).unwrap_or_default();
                Order::from_rows(row, &lines)
            })
            .collect())
    }

    async fn get_order(&self, id: i32) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> =
            sqlx::query_as("SELECT id, user_id, status, created_at FROM orders WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = self.load_lines(&[row.id]).await?;
        Ok(Some(Order::from_rows(row, &lines)))
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;

        let user: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(request.user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if user.is_none() {
            return Err(StoreError::UserNotFound(request.user_id));
        }

        // Lock the rows so concurrent orders cannot oversell.
        let mut names: HashMap<i32, String> = HashMap::new();
        for (product_id, requested) in requested_quantities(request) {
            let product: Product = sqlx::query_as(
                r#"
                SELECT id, name, description, price, stock, image_url
                FROM products
                WHERE id = $1
                FOR UPDATE
                "#,
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::ProductNotFound(product_id))?;

            if i64::from(product.stock) < requested {
                return Err(StoreError::InsufficientStock {
                    name: product.name,
                    requested,
                    available: product.stock,
                });
            }
            names.insert(product.id, product.name);
        }

        let row: OrderRow = sqlx::query_as(
            r#"
            INSERT INTO orders (user_id, status)
            VALUES ($1, $2)
            RETURNING id, user_id, status, created_at
            "#,
        )
        .bind(request.user_id)
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(request.order_items.len());
        for item in &request.order_items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)",
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2")
                .bind(item.quantity)
                .bind(item.product_id)
                .execute(&mut *tx)
                .await?;

            items.push(OrderLine {
                product_id: item.product_id,
                product_name: names.get(&item.product_id).cloned().unwrap_or_default(),
                quantity: item.quantity,
                price: item.price,
            });
        }

        tx.commit().await?;
        info!("Order {} placed by user {}", row.id, row.user_id);

        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            status: row.status,
            created_at: row.created_at,
            items,
        })
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as(
            "SELECT id, name, description, price, stock, image_url FROM products ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn get_product(&self, id: i32) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as(
            "SELECT id, name, description, price, stock, image_url FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn list_product_summaries(&self) -> Result<Vec<ProductSummary>, StoreError> {
        let products = sqlx::query_as("SELECT id, name FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }
}
