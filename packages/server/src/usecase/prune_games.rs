//! UseCase: 空のゲームの削除
//!
//! ゲームはメンバーがいなくなっても自動では削除されません。
//! 運用者が明示的に呼び出したときだけ、メンバーのいないゲームを取り除きます。
//! サーバーではメッセージと同じディスパッチャ上で実行されます（`ui::dispatcher`）。

use std::sync::Arc;

use crate::domain::{GameKey, GameRepository};

/// 空のゲームを削除するユースケース
pub struct PruneGamesUseCase {
    games: Arc<dyn GameRepository>,
}

impl PruneGamesUseCase {
    pub fn new(games: Arc<dyn GameRepository>) -> Self {
        Self { games }
    }

    /// # Returns
    ///
    /// 削除したゲームのアドレス（昇順）
    pub async fn execute(&self) -> Vec<GameKey> {
        let removed = self.games.remove_empty().await;
        if removed.is_empty() {
            tracing::debug!("No empty games to prune");
        } else {
            tracing::info!("Pruned {} empty game(s)", removed.len());
        }
        removed
    }
}
