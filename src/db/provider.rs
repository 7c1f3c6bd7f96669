use log::warn;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, PgConnection, PgPool};

use crate::db::DbError;

/// Owns the process-wide connection pool.
///
/// Created once per `DatabaseContext`; `shutdown` closes every pooled connection.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    pool: PgPool,
}

impl ConnectionProvider {
    /// Build a pool that opens connections on first use
    pub fn new(options: PgConnectOptions, max_connections: u32) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy_with(options);

        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}

/// Open a connection outside the pool for administrative statements
pub async fn open_connection(options: &PgConnectOptions) -> Result<PgConnection, DbError> {
    Ok(PgConnection::connect_with(options).await?)
}

/// Close an administrative connection. Failures are logged, never returned,
/// so callers can release unconditionally after their own work.
pub async fn release_connection(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close administrative connection cleanly: {}", e);
    }
}
