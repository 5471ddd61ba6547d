use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{NewTournament, TournamentId, TournamentModel, TournamentStatus},
    repository::{JoinTournamentResult, TournamentRepository},
    types::{TournamentCreateRequest, TournamentResponse},
};
use crate::{
    shared::AppError,
    user::{models::UserId, repository::UserRepository, types::UserSummary, UserService},
};

/// Service for handling tournament business logic
pub struct TournamentService {
    repository: Arc<dyn TournamentRepository>,
    users: UserService,
}

impl TournamentService {
    pub fn new(
        repository: Arc<dyn TournamentRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            repository,
            users: UserService::new(user_repository),
        }
    }

    /// Creates a tournament in CREATED status with an empty roster
    #[instrument(skip(self))]
    pub async fn create_tournament(
        &self,
        request: TournamentCreateRequest,
    ) -> Result<TournamentResponse, AppError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidArgument(
                "Tournament name must not be blank".to_string(),
            ));
        }
        if request.max_players < 2 {
            return Err(AppError::InvalidArgument(
                "A tournament needs room for at least 2 players".to_string(),
            ));
        }

        if self.repository.find_tournament_by_name(name).await?.is_some() {
            warn!(name = %name, "Tournament name already taken");
            return Err(AppError::InvalidArgument(
                "A tournament with this name already exists".to_string(),
            ));
        }

        // Creator must exist before anything is written
        self.users.get_user(request.creator_id).await?;

        let tournament = self
            .repository
            .create_tournament(&NewTournament {
                name: name.to_string(),
                max_players: request.max_players,
                creator_id: request.creator_id,
            })
            .await?;

        info!(
            tournament_id = tournament.id,
            name = %tournament.name,
            max_players = tournament.max_players,
            "Tournament created"
        );

        self.to_response(tournament).await
    }

    #[instrument(skip(self))]
    pub async fn list_tournaments(&self) -> Result<Vec<TournamentResponse>, AppError> {
        let tournaments = self.repository.list_tournaments().await?;
        debug!(tournament_count = tournaments.len(), "Tournaments retrieved");

        let mut responses = Vec::with_capacity(tournaments.len());
        for tournament in tournaments {
            responses.push(self.to_response(tournament).await?);
        }
        Ok(responses)
    }

    #[instrument(skip(self))]
    pub async fn get_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<TournamentResponse, AppError> {
        let tournament = self.load(tournament_id).await?;
        self.to_response(tournament).await
    }

    /// Adds a player to the roster of a tournament that has not started yet
    #[instrument(skip(self))]
    pub async fn join_tournament(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> Result<TournamentResponse, AppError> {
        self.load(tournament_id).await?;
        self.users.get_user(user_id).await?;

        match self
            .repository
            .try_join_tournament(tournament_id, user_id)
            .await?
        {
            JoinTournamentResult::Success(updated) => {
                info!(
                    tournament_id = tournament_id,
                    user_id = user_id,
                    player_count = updated.player_count(),
                    "Player joined tournament"
                );
                self.to_response(updated).await
            }
            JoinTournamentResult::TournamentNotFound => Err(not_found(tournament_id)),
            JoinTournamentResult::NotAcceptingPlayers => Err(AppError::InvalidState(
                "Players can only join tournaments in CREATED status".to_string(),
            )),
            JoinTournamentResult::Full => {
                Err(AppError::InvalidState("Tournament is full".to_string()))
            }
            JoinTournamentResult::AlreadyJoined => Err(AppError::InvalidArgument(
                "Player already registered in this tournament".to_string(),
            )),
        }
    }

    /// Moves a tournament along its lifecycle; finished tournaments stay finished
    #[instrument(skip(self))]
    pub async fn update_tournament_status(
        &self,
        tournament_id: TournamentId,
        status: TournamentStatus,
    ) -> Result<TournamentResponse, AppError> {
        let mut tournament = self.load(tournament_id).await?;

        if !tournament.status.can_transition_to(status) {
            warn!(
                tournament_id = tournament_id,
                from = %tournament.status,
                to = %status,
                "Rejected tournament status transition"
            );
            return Err(AppError::InvalidState(format!(
                "Cannot move tournament from {} to {}",
                tournament.status, status
            )));
        }

        tournament.status = status;
        let saved = self.repository.save_tournament(&tournament).await?;

        info!(tournament_id = tournament_id, status = %saved.status, "Tournament status updated");
        self.to_response(saved).await
    }

    async fn load(&self, tournament_id: TournamentId) -> Result<TournamentModel, AppError> {
        self.repository
            .find_tournament_by_id(tournament_id)
            .await?
            .ok_or_else(|| not_found(tournament_id))
    }

    async fn to_response(&self, tournament: TournamentModel) -> Result<TournamentResponse, AppError> {
        let mut ids = tournament.player_ids.clone();
        ids.push(tournament.creator_id);
        let directory = self.users.directory(&ids).await?;

        let mut players: Vec<UserSummary> = tournament
            .player_ids
            .iter()
            .map(|id| UserSummary::from(&directory[id]))
            .collect();
        players.sort_by_key(|p| p.id);

        Ok(TournamentResponse {
            id: tournament.id,
            name: tournament.name,
            status: tournament.status,
            max_players: tournament.max_players,
            created_at: tournament.created_at,
            creator: UserSummary::from(&directory[&tournament.creator_id]),
            players,
        })
    }
}

fn not_found(tournament_id: TournamentId) -> AppError {
    AppError::NotFound(format!("Tournament {} not found", tournament_id))
}
