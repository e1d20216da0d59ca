//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool with an explicit limit - no Arc<Mutex<Connection>>
//! - List operations use JOINs - no N+1 queries
//! - One transaction per multi-step operation
//! - Statistic counters change only through the response repository

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_memory_pool, create_pool, create_pool_with_options};
pub use repos::*;

use sqlx::SqlitePool;

/// Open a migrated in-memory database (for testing)
pub async fn open_in_memory() -> Result<SqlitePool, DbError> {
    let pool = create_memory_pool().await?;
    migrations::run(&pool).await?;
    Ok(pool)
}
