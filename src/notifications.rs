mod observers;

pub use observers::*;

use crate::database::{get_connection, queries, DatabaseConnectionPool};
use crate::models::Notification;

#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    ConnectionUnavailable(#[from] crate::database::ConnectionUnavailable),
    #[error("Failed to persist notification.")]
    DatabaseError(#[from] diesel::result::Error),
}

/// Persists admin notifications and pushes them to live observers.
#[derive(Clone)]
pub struct NotificationBroadcaster {
    pool: DatabaseConnectionPool,
    observers: ObserverRegistry,
}

impl NotificationBroadcaster {
    pub fn new(pool: DatabaseConnectionPool, observers: ObserverRegistry) -> Self {
        Self { pool, observers }
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// The push goes out even when persisting fails; admins who miss it can
    /// only recover it from the stored row.
    #[tracing::instrument(name = "Publishing notification", skip(self))]
    pub async fn publish(
        &self,
        message: &str,
    ) -> Result<Notification, PublishError> {
        let persisted = self.persist(message).await;
        if let Err(e) = &persisted {
            tracing::error!(error = ?e, "Could not save notification.");
        }
        let delivered = self.observers.broadcast(&PushEvent {
            message: message.to_owned(),
        });
        tracing::info!(delivered, "Notification pushed to observers.");
        persisted
    }

    async fn persist(&self, message: &str) -> Result<Notification, PublishError> {
        let mut connection = get_connection(&self.pool).await?;
        Ok(queries::insert_notification(&mut connection, message).await?)
    }
}
