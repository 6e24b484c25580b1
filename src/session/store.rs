use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::Session;

/// A session behind its own lock; holding it serializes turns.
pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(Session::new(id)));
        self.inner.write().await.insert(id, handle.clone());
        info!(session_id = %id, "Session created");
        (id, handle)
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Look up a session, creating it on first use.
    pub async fn get_or_create(&self, id: Uuid) -> SessionHandle {
        if let Some(handle) = self.get(id).await {
            return handle;
        }

        let mut guard = self.inner.write().await;
        guard
            .entry(id)
            .or_insert_with(|| {
                debug!(session_id = %id, "Session initialized on first use");
                Arc::new(Mutex::new(Session::new(id)))
            })
            .clone()
    }

    /// Tear a session down. Returns false if it did not exist.
    ///
    /// Does not wait for a turn in flight; that turn finishes against the
    /// detached session and its result is dropped with it.
    pub async fn end(&self, id: Uuid) -> bool {
        let removed = self.inner.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Session ended");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
