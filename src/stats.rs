//! # Dashboard Order Statistics
//!
//! Pure aggregation over an already-fetched order snapshot. The storage layer
//! may push the status and day predicates down into SQL, but [`compute_stats`]
//! applies the whole [`StatsFilter`] again so the result is the same whichever
//! way the orders were loaded.
//!
//! ## Product filter
//!
//! When `product_id` is set, an order is only counted if one of its lines
//! references the product, and only those lines contribute to any revenue or
//! quantity sum. `avg_per_day` still divides by the day's order count, so under
//! a product filter it is product revenue per order, not a per-product average.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Order, OrderLine, OrderStatus};

// ============================================================================
// Filter
// ============================================================================

/// Optional predicates narrowing which orders and lines are aggregated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsFilter {
    /// Exact, case-sensitive status match. `None` or empty keeps every status.
    pub status: Option<String>,
    /// Calendar day in server-local time.
    pub day: Option<NaiveDate>,
    pub product_id: Option<i32>,
}

impl StatsFilter {
    /// The status predicate, with empty strings treated as absent.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.is_empty())
    }

    /// Half-open `[start, end)` bounds of the day filter. `end` is `None` only
    /// for the last representable date.
    pub fn day_range(&self) -> Option<(NaiveDateTime, Option<NaiveDateTime>)> {
        self.day.map(|day| {
            let start = day.and_time(NaiveTime::MIN);
            let end = day
                .checked_add_days(Days::new(1))
                .map(|next| next.and_time(NaiveTime::MIN));
            (start, end)
        })
    }

    /// Whether `line` contributes to line-level sums.
    pub fn includes_line(&self, line: &OrderLine) -> bool {
        self.product_id.map_or(true, |id| line.product_id == id)
    }

    /// Whether `order` passes the status, day and product predicates.
    pub fn includes_order(&self, order: &Order) -> bool {
        if let Some(status) = self.status() {
            if order.status != status {
                return false;
            }
        }

        if let Some((start, end)) = self.day_range() {
            if order.created_at < start {
                return false;
            }
            if end.is_some_and(|end| order.created_at >= end) {
                return false;
            }
        }

        if self.product_id.is_some() {
            return order.items.iter().any(|line| self.includes_line(line));
        }

        true
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Orders created on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Included-line revenue for orders created on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRevenue {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

/// Revenue divided by order count for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAverage {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg: Decimal,
}

/// Quantity and revenue sold for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: i32,
    pub name: String,
    pub qty: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

/// Aggregate returned by the dashboard stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_orders: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_order_value: Decimal,
    pub pending: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub processing: u64,
    /// Sorted by date ascending.
    pub orders_per_day: Vec<DayCount>,
    /// Sorted by date ascending.
    pub revenue_per_day: Vec<DayRevenue>,
    /// Sorted by date ascending.
    pub avg_per_day: Vec<DayAverage>,
    /// Sorted by quantity descending; ties keep first-seen order.
    pub top_products: Vec<ProductSales>,
}

#[derive(Debug, Default)]
struct DayTotals {
    count: u64,
    revenue: Decimal,
}

// ============================================================================
// Aggregation
// ============================================================================

/// Compute dashboard statistics for `orders` under `filter`.
///
/// Never fails: an empty or fully filtered-out snapshot yields a zeroed summary.
pub fn compute_stats(orders: &[Order], filter: &StatsFilter) -> StatsSummary {
    let mut summary = StatsSummary::default();
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    let mut ranking: Vec<ProductSales> = Vec::new();
    let mut ranking_index: HashMap<i32, usize> = HashMap::new();

    for order in orders.iter().filter(|order| filter.includes_order(order)) {
        let mut order_revenue = Decimal::ZERO;

        for line in order.items.iter().filter(|line| filter.includes_line(line)) {
            let amount = line.amount();
            order_revenue += amount;

            let slot = *ranking_index.entry(line.product_id).or_insert_with(|| {
                ranking.push(ProductSales {
                    product_id: line.product_id,
                    name: line.product_name.clone(),
                    qty: 0,
                    revenue: Decimal::ZERO,
                });
                ranking.len() - 1
            });
            ranking[slot].qty += i64::from(line.quantity);
            ranking[slot].revenue += amount;
        }

        summary.total_orders += 1;
        summary.total_revenue += order_revenue;

        match order.status.parse::<OrderStatus>() {
            Ok(OrderStatus::Pending) => summary.pending += 1,
            Ok(OrderStatus::Completed) => summary.completed += 1,
            Ok(OrderStatus::Cancelled) => summary.cancelled += 1,
            Ok(OrderStatus::Processing) => summary.processing += 1,
            Err(_) => {}
        }

        let day = days.entry(order.created_at.date()).or_default();
        day.count += 1;
        day.revenue += order_revenue;
    }

    summary.avg_order_value = average(summary.total_revenue, summary.total_orders);

    for (date, totals) in &days {
        summary.orders_per_day.push(DayCount {
            date: *date,
            count: totals.count,
        });
        summary.revenue_per_day.push(DayRevenue {
            date: *date,
            revenue: totals.revenue,
        });
        summary.avg_per_day.push(DayAverage {
            date: *date,
            avg: average(totals.revenue, totals.count),
        });
    }

    // sort_by is stable, so equal quantities stay in discovery order
    ranking.sort_by(|a, b| b.qty.cmp(&a.qty));
    summary.top_products = ranking;

    summary
}

fn average(total: Decimal, count: u64) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}
