//! Blocking operation helpers for the `PostgreSQL` sibling stores.
//!
//! Diesel is synchronous; every store operation is offloaded to a dedicated
//! thread pool via [`tokio::task::spawn_blocking`] so it never blocks the
//! async executor's worker threads.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};

use crate::ordering::ports::{SiblingStoreError, SiblingStoreResult};

/// `PostgreSQL` connection pool type used by the sibling stores.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Pooled connection type for internal use.
pub(super) type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Runs a blocking database operation on a dedicated thread pool.
pub(super) async fn run_blocking<F, T>(f: F) -> SiblingStoreResult<T>
where
    F: FnOnce() -> SiblingStoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(SiblingStoreError::persistence)?
}

/// Obtains a connection from the pool.
pub(super) fn get_conn(pool: &PgPool) -> SiblingStoreResult<PooledConn> {
    pool.get().map_err(SiblingStoreError::persistence)
}
