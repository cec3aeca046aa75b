//! `SQLite` backend for the ledger.
//!
//! - **[`connection`]**: `r2d2` pool with WAL mode, foreign keys and a busy
//!   timeout applied to every connection.
//! - **[`migrations`]**: version-tracked schema, embedded at compile time.
//! - **[`row_types`]**: row structs and aggregate read models.
//! - **[`row_helpers`]**: column decoding and SQL text helpers.
//! - **[`repositories`]**: stateless repositories, one per table.

pub mod connection;
pub mod migrations;
pub mod repositories;
pub mod row_helpers;
pub mod row_types;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection, new_file, new_in_memory};
pub use migrations::{current_version, latest_version, run_migrations};
