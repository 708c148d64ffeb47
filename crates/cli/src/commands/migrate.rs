//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! saved-cart migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SAVED_CART_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Embedded at build time from `crates/server/migrations/`.

use saved_cart_server::db;

use super::{CommandError, database_url};

/// Run the saved cart migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to saved cart database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running saved cart migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Saved cart migrations complete!");
    Ok(())
}
