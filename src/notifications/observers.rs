use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Payload pushed to admin dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushEvent {
    pub message: String,
}

/// The set of live admin connections.
///
/// Each observer owns a bounded queue. Broadcasting never waits: a full queue
/// misses the event, a closed queue is dropped from the set.
#[derive(Clone)]
pub struct ObserverRegistry {
    observers: Arc<Mutex<HashMap<Uuid, mpsc::Sender<PushEvent>>>>,
    buffer: usize,
}

impl ObserverRegistry {
    pub fn new(buffer: usize) -> Self {
        Self {
            observers: Arc::new(Mutex::new(HashMap::new())),
            buffer: buffer.max(1),
        }
    }

    pub fn subscribe(&self) -> Observer {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let id = Uuid::now_v7();
        self.lock().insert(id, sender);
        tracing::info!(observer_id = %id, "Admin observer connected.");
        Observer {
            id,
            receiver,
            registry: self.clone(),
        }
    }

    /// Returns how many observers accepted the event.
    pub fn broadcast(&self, event: &PushEvent) -> usize {
        let mut delivered = 0;
        self.lock().retain(|id, sender| match sender.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(observer_id = %id, "Observer is lagging, event skipped.");
                true
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(observer_id = %id, "Pruning closed observer.");
                false
            }
        });
        delivered
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ends every live subscription; used on shutdown.
    pub fn close_all(&self) {
        self.lock().clear();
    }

    fn remove(&self, id: &Uuid) {
        if self.lock().remove(id).is_some() {
            tracing::info!(observer_id = %id, "Admin observer disconnected.");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, mpsc::Sender<PushEvent>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A subscription handle; dropping it leaves the registry.
pub struct Observer {
    id: Uuid,
    receiver: mpsc::Receiver<PushEvent>,
    registry: ObserverRegistry,
}

impl Observer {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// `None` once the registry has closed this subscription.
    pub async fn recv(&mut self) -> Option<PushEvent> {
        self.receiver.recv().await
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}
