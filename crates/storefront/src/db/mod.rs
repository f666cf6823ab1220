//! Database operations for the storefront `PostgreSQL` instance.
//!
//! # Database: `kw_storefront`
//!
//! ## Tables
//!
//! - `users` - Site authentication
//! - `profiles` - Shopper contact details (checkout prefill)
//! - `sessions` - Tower-sessions storage (cart + login state)
//! - `subjects` - Tutored subjects directory
//! - `tutors` - Tutor directory
//! - `products` - Shop catalog
//! - `orders` / `order_items` - Order headers and line items
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p kingsway-cli -- migrate storefront
//! ```

pub mod catalog;
pub mod orders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Errors that can occur in repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unique constraint violation (e.g., duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value failed validation when read back.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}
