//! `SQLite` connection pools for the ledger.
//!
//! Pragmas are applied by the connection manager's init hook, once per
//! physical connection, so every pooled handle behaves the same.

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::Result;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Configuration for the connection pool.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Maximum pool size (default: 8).
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 5000).
    pub busy_timeout_ms: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

/// How long `pool.get()` waits before reporting a pool error.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-connection setup: WAL journal, busy timeout, enforced foreign keys.
///
/// An in-memory database reports `memory` as its journal mode and ignores
/// the WAL request.
fn prepare(conn: &mut Connection, busy_timeout_ms: u32) -> rusqlite::Result<()> {
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.busy_timeout(Duration::from_millis(u64::from(busy_timeout_ms)))?;
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.pragma_update(None, "synchronous", "NORMAL")
}

fn manager_with_pragmas(
    manager: SqliteConnectionManager,
    config: &ConnectionConfig,
) -> SqliteConnectionManager {
    let busy_timeout_ms = config.busy_timeout_ms;
    manager.with_init(move |conn| prepare(conn, busy_timeout_ms))
}

/// Create an in-memory pool (tests and dry runs).
///
/// Every in-memory connection is a separate database, so the pool holds
/// exactly one connection and never retires it. A caller that checks out a
/// second connection while holding the first waits for `CHECKOUT_TIMEOUT`
/// and fails.
pub fn new_in_memory(config: &ConnectionConfig) -> Result<ConnectionPool> {
    let manager = manager_with_pragmas(SqliteConnectionManager::memory(), config);
    Ok(Pool::builder()
        .max_size(1)
        .min_idle(Some(1))
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .build(manager)?)
}

/// Create a file-backed pool of up to `config.pool_size` connections.
pub fn new_file(path: &Path, config: &ConnectionConfig) -> Result<ConnectionPool> {
    let manager = manager_with_pragmas(SqliteConnectionManager::file(path), config);
    Ok(Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .build(manager)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn pragma_i64(conn: &Connection, name: &str) -> i64 {
        conn.query_row(&format!("PRAGMA {name}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn in_memory_pool_is_single_connection() {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        assert_eq!(pool.max_size(), 1);
        let conn = pool.get().unwrap();
        assert_eq!(pragma_i64(&conn, "foreign_keys"), 1);
    }

    #[test]
    fn file_pool_uses_wal_and_busy_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConnectionConfig {
            pool_size: 3,
            busy_timeout_ms: 1_234,
        };
        let pool = new_file(&dir.path().join("ledger.db"), &config).unwrap();
        assert_eq!(pool.max_size(), 3);

        let conn = pool.get().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
        assert_eq!(pragma_i64(&conn, "busy_timeout"), 1_234);
        assert_eq!(pragma_i64(&conn, "foreign_keys"), 1);
    }

    #[test]
    fn file_pool_hands_out_concurrent_connections() {
        let dir = tempfile::tempdir().unwrap();
        let pool = new_file(&dir.path().join("ledger.db"), &ConnectionConfig::default()).unwrap();
        let conns: Vec<_> = (0..4).map(|_| pool.get().unwrap()).collect();
        assert_eq!(conns.len(), 4);
    }
}
