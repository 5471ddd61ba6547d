use async_trait::async_trait;

use super::models::{NewTournament, TournamentId, TournamentModel};
use crate::shared::AppError;
use crate::user::models::UserId;

/// Result of attempting to join a tournament
#[derive(Debug, Clone)]
pub enum JoinTournamentResult {
    /// Player added to the roster, returns updated tournament
    Success(TournamentModel),
    /// Tournament does not exist
    TournamentNotFound,
    /// Tournament is no longer in CREATED status
    NotAcceptingPlayers,
    /// Roster already holds max_players
    Full,
    /// Player is already on the roster
    AlreadyJoined,
}

/// Trait for tournament repository operations
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    async fn create_tournament(&self, tournament: &NewTournament) -> Result<TournamentModel, AppError>;
    async fn find_tournament_by_id(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Option<TournamentModel>, AppError>;
    async fn find_tournament_by_name(&self, name: &str) -> Result<Option<TournamentModel>, AppError>;
    async fn list_tournaments(&self) -> Result<Vec<TournamentModel>, AppError>;

    /// Overwrites the tournament row (status, capacity, name). The roster is
    /// left as stored and the saved state is returned.
    async fn save_tournament(&self, tournament: &TournamentModel) -> Result<TournamentModel, AppError>;

    /// Atomically checks status, capacity and membership before adding the player
    /// This prevents two joins from overfilling the roster
    async fn try_join_tournament(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> Result<JoinTournamentResult, AppError>;
}
