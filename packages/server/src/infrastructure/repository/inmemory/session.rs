//! InMemory Session Repository 実装
//!
//! Session は一度作成されるとプロセス終了まで削除されません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Session, SessionId, SessionRepository};

/// インメモリ Session Repository 実装
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find(&self, id: &SessionId) -> Option<Session> {
        let sessions = self.sessions.lock().await;
        sessions.get(id).cloned()
    }

    async fn save(&self, session: Session) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.id.clone(), session);
    }

    async fn list(&self) -> Vec<Session> {
        let sessions = self.sessions.lock().await;
        sessions.values().cloned().collect()
    }
}
