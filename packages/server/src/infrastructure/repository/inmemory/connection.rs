//! InMemory Connection Registry 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConnectionRegistry, SessionId};

/// インメモリ Connection Registry 実装
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    /// Key: connection id, Value: session id
    bindings: Mutex<HashMap<ConnectionId, SessionId>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn bind(&self, connection_id: ConnectionId, session_id: SessionId) {
        let mut bindings = self.bindings.lock().await;
        tracing::debug!(
            "Connection '{}' bound to session '{}'",
            connection_id,
            session_id
        );
        bindings.insert(connection_id, session_id);
    }

    async fn lookup(&self, connection_id: &ConnectionId) -> Option<SessionId> {
        let bindings = self.bindings.lock().await;
        bindings.get(connection_id).cloned()
    }

    async fn unbind(&self, connection_id: &ConnectionId) {
        let mut bindings = self.bindings.lock().await;
        if bindings.remove(connection_id).is_some() {
            tracing::debug!("Connection '{}' unbound", connection_id);
        }
    }

    async fn count(&self) -> usize {
        let bindings = self.bindings.lock().await;
        bindings.len()
    }
}
