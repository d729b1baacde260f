//! Database helpers for the cafeteria orders service.
//!
//! The pool is opened once in `main`, handed to [`crate::store::PgStore`], and
//! closed after the server has drained.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;

/// Type alias for the application database pool.
pub type AppDb = PgPool;

/// Open the application pool.
pub async fn connect(config: &AppConfig) -> Result<AppDb, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
}

/// Apply the embedded schema migrations.
pub async fn migrate(pool: &AppDb) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
