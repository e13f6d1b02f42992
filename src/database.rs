use diesel_async::pooled_connection::deadpool::{Object, Pool, PoolError};
use diesel_async::AsyncPgConnection;

pub mod diesel_configuration;
pub mod queries;

pub type DatabaseConnection = Object<AsyncPgConnection>;
pub type DatabaseConnectionPool = Pool<AsyncPgConnection>;

/// The pool had no connection to hand out within its wait timeout, or the
/// backend refused a new one. Callers may retry.
#[derive(Debug, thiserror::Error)]
#[error("No database connection is available right now.")]
pub struct ConnectionUnavailable(#[from] PoolError);

#[tracing::instrument(
    name = "Retrieving database connection from pool.",
    skip(pool)
)]
pub async fn get_connection(
    pool: &DatabaseConnectionPool,
) -> Result<DatabaseConnection, ConnectionUnavailable> {
    match pool.get().await {
        Ok(conn) => {
            tracing::debug!("Connection established.");
            Ok(conn)
        }
        Err(e) => {
            tracing::error!(
                "Could not get connection from pool, with error: {:?}",
                e
            );
            Err(ConnectionUnavailable(e))
        }
    }
}

pub use diesel_configuration::create_connection_pool;
