//! UseCase: セッション一覧の取得

use std::sync::Arc;

use crate::domain::{Session, SessionRepository};

/// セッション一覧取得のユースケース
pub struct GetSessionsUseCase {
    sessions: Arc<dyn SessionRepository>,
}

impl GetSessionsUseCase {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// 全セッションを ID 順に返す（切断済みのセッションも含む）
    pub async fn execute(&self) -> Vec<Session> {
        let mut sessions = self.sessions.list().await;
        sessions.sort_by(|a, b| a.id.cmp(&b.id));
        sessions
    }
}
