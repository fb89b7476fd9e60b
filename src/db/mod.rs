//! Database layer
//!
//! SQLite persistence for the Credo service. The deployment target is a
//! single-process service with one embedded database file, so there is no
//! driver abstraction; repositories talk to a shared `SqlitePool`.
//!
//! # Usage
//!
//! ```ignore
//! use credo::config::DatabaseConfig;
//! use credo::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
