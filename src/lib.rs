//! # Cafeteria Orders Library
//!
//! Exposes the Axum router and modules so integration tests can create
//! an in-process server over any [`store::CafeteriaStore`].

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod stats;
pub mod store;

use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::SharedStore;

/// Build the Axum router with all route modules and middleware.
///
/// The caller owns the store's lifecycle. This function does NOT start a
/// server or open a database connection.
pub fn create_app(store: SharedStore) -> Router {
    Router::new()
        .merge(routes::dashboard::router())
        .merge(routes::orders::router())
        .merge(routes::products::router())
        .layer(Extension(store))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
