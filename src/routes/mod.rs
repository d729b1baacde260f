//! HTTP route modules for the cafeteria orders service.
//!
//! - `dashboard`: order statistics and the product filter list
//! - `orders`: order placement and history
//! - `products`: read-only public catalog

pub mod dashboard;
pub mod orders;
pub mod products;
