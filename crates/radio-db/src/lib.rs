//! # radio-db
//!
//! Database layer implementing repository traits with SQLite via SQLx.
//!
//! ## Overview
//!
//! This crate provides SQLite implementations for the repository traits
//! defined in `radio-core`. It handles:
//!
//! - Connection pool management
//! - Schema creation and evolution of older database files
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use radio_db::{create_pool, run_migrations, DatabaseConfig, SqliteUserRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     run_migrations(&pool).await?;
//!     let users = SqliteUserRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod schema;

// Re-export commonly used types
pub use pool::{create_memory_pool, create_pool, DatabaseConfig, SqlitePool};
pub use repositories::{
    SqliteDeliveryLogRepository, SqlitePrisonRepository, SqliteUserRepository,
};
pub use schema::run_migrations;
