use async_trait::async_trait;

use super::models::{MatchId, MatchModel, MatchResult, MatchStatus};
use crate::shared::AppError;
use crate::tournament::models::TournamentId;
use crate::user::models::UserId;

/// Everything one round generation writes, committed as a single unit
#[derive(Debug, Clone)]
pub struct RoundCommit {
    pub tournament_id: TournamentId,
    pub round_number: i32,
    /// (player1, player2) in shuffled order; stored as PENDING/PENDING matches
    pub pairings: Vec<(UserId, UserId)>,
    /// Promote the tournament from CREATED to IN_PROGRESS in the same transaction.
    /// When false the tournament row is not touched.
    pub promote_tournament: bool,
}

/// Result of attempting to record a terminal match result
#[derive(Debug, Clone)]
pub enum CompleteMatchResult {
    /// Match moved to COMPLETED, returns updated match
    Success(MatchModel),
    /// Match does not exist
    MatchNotFound,
    /// Match was already COMPLETED, nothing written
    AlreadyCompleted,
}

/// Trait for match repository operations
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn find_match_by_id(&self, match_id: MatchId) -> Result<Option<MatchModel>, AppError>;
    async fn find_matches_by_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<MatchModel>, AppError>;
    async fn find_matches_by_tournament_and_round(
        &self,
        tournament_id: TournamentId,
        round_number: i32,
    ) -> Result<Vec<MatchModel>, AppError>;
    async fn find_matches_by_tournament_and_status(
        &self,
        tournament_id: TournamentId,
        status: MatchStatus,
    ) -> Result<Vec<MatchModel>, AppError>;

    /// Atomically claims (tournament, round), inserts the round's matches and,
    /// if requested, promotes the tournament. A round that was already claimed
    /// fails with InvalidState and leaves nothing written.
    async fn commit_round(&self, commit: &RoundCommit) -> Result<Vec<MatchModel>, AppError>;

    /// Atomically moves a non-completed match to COMPLETED with the given outcome
    async fn complete_match(
        &self,
        match_id: MatchId,
        result: MatchResult,
        winner_id: Option<UserId>,
    ) -> Result<CompleteMatchResult, AppError>;
}
