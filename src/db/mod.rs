//! Database layer
//!
//! SQLite (default) and MySQL behind the [`DatabasePool`] trait, an embedded
//! schema bootstrap and one repository per entity.
//!
//! ```ignore
//! use handon::config::DatabaseConfig;
//! use handon::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
