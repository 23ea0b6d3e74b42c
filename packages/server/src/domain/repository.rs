//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 3 つのストアは互いに ID でのみ参照し合います:
//!
//! ```text
//! ConnectionRegistry: ConnectionId -> SessionId
//! SessionRepository:  SessionId    -> Session (membership: GameKey)
//! GameRepository:     GameKey      -> Game (members: SessionId -> GameSession)
//! ```

use async_trait::async_trait;

use super::{ConnectionId, Game, GameKey, RepositoryError, Session, SessionId};

/// Connection Registry trait
///
/// Maps live connections to the session they currently represent.
/// All operations are total over their key space.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Bind a connection to a session, overwriting any previous mapping
    async fn bind(&self, connection_id: ConnectionId, session_id: SessionId);

    /// Session bound to a connection
    async fn lookup(&self, connection_id: &ConnectionId) -> Option<SessionId>;

    /// Remove a connection's mapping (no-op when absent)
    async fn unbind(&self, connection_id: &ConnectionId);

    /// Number of bound connections
    async fn count(&self) -> usize;
}

/// Session Repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Session エンティティを取得
    async fn find(&self, id: &SessionId) -> Option<Session>;

    /// Session エンティティを保存（新規作成または上書き）
    async fn save(&self, session: Session);

    /// 全ての Session を取得
    async fn list(&self) -> Vec<Session>;
}

/// Game Repository trait
///
/// Games are never removed implicitly; `remove_empty` is the only way a
/// game leaves the store.
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Game エンティティを取得
    async fn find(&self, key: &GameKey) -> Option<Game>;

    /// Game エンティティを取得し、存在しなければ空の Game を作成して保存
    async fn find_or_create(&self, key: &GameKey) -> Game;

    /// Game エンティティを保存（新規作成または上書き）
    async fn save(&self, game: Game);

    /// Game からメンバーを削除し、更新後の Game を返す
    ///
    /// The game itself is kept even when it becomes empty.
    async fn remove_member(
        &self,
        key: &GameKey,
        session_id: &SessionId,
    ) -> Result<Game, RepositoryError>;

    /// 全ての Game を取得
    async fn list(&self) -> Vec<Game>;

    /// メンバーのいない Game を削除し、削除したキーを返す
    async fn remove_empty(&self) -> Vec<GameKey>;
}
