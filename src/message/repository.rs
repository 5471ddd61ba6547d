use async_trait::async_trait;

use super::models::{MessageModel, NewMessage};
use crate::matches::models::MatchId;
use crate::shared::AppError;
use crate::tournament::models::TournamentId;

/// Trait for chat message storage
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create_message(&self, message: &NewMessage) -> Result<MessageModel, AppError>;

    /// Messages of a tournament chat, oldest first
    async fn find_messages_by_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<MessageModel>, AppError>;

    /// Messages of a match chat, oldest first
    async fn find_messages_by_match(&self, match_id: MatchId) -> Result<Vec<MessageModel>, AppError>;
}
