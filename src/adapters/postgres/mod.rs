//! PostgreSQL adapters - Database implementations for the persistence ports.
//!
//! - `PostgresCycleStore` - Cycle state per user (JSONB), append-only
//!   work/rest records and the per-conduct activity log
//! - `PostgresConductRegistry` - Conducts and their participants

mod conduct_registry;
mod cycle_store;

pub use conduct_registry::PostgresConductRegistry;
pub use cycle_store::PostgresCycleStore;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::domain::foundation::DomainError;

/// Opens a connection pool and applies the bundled migrations when enabled.
///
/// # Errors
///
/// Returns `DatabaseError` if the pool cannot connect or a migration fails.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| {
DomainError::database(format!("Failed to connect to database: {}", e))
        })?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
DomainError::database(format!("Failed to run migrations: {}", e))
            })?;
    }

    Ok(pool)
}
