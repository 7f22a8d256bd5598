//! # bmshub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement `PlatformConfigRepository` from `bmshub-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `bmshub-app` (for port traits) and `bmshub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod platform_config_repo;
mod pool;

pub use error::StorageError;
pub use platform_config_repo::SqlitePlatformConfigRepository;
pub use pool::{Config, Database};
