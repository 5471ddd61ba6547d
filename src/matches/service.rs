use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{MatchId, MatchModel, MatchResult},
    pairing::{shuffle_and_pair, PlayerShuffler},
    repository::{CompleteMatchResult, MatchRepository, RoundCommit},
    types::{MatchResponse, TournamentSummary},
};
use crate::{
    shared::AppError,
    tournament::{
        models::{TournamentId, TournamentModel, TournamentStatus},
        repository::TournamentRepository,
    },
    user::{models::UserId, repository::UserRepository, types::UserSummary, UserService},
};

/// Service for round generation, result recording and match lookups
pub struct MatchService {
    matches: Arc<dyn MatchRepository>,
    tournaments: Arc<dyn TournamentRepository>,
    user_repository: Arc<dyn UserRepository>,
    shuffler: Arc<dyn PlayerShuffler>,
}

impl MatchService {
    pub fn new(
        matches: Arc<dyn MatchRepository>,
        tournaments: Arc<dyn TournamentRepository>,
        user_repository: Arc<dyn UserRepository>,
        shuffler: Arc<dyn PlayerShuffler>,
    ) -> Self {
        Self {
            matches,
            tournaments,
            user_repository,
            shuffler,
        }
    }

    /// Pairs the tournament roster into matches for one round.
    ///
    /// Preconditions are checked in order and the first failure wins; nothing is
    /// written unless all of them hold. At most one call per (tournament, round)
    /// succeeds, and the first successful round moves a CREATED tournament to
    /// IN_PROGRESS in the same commit.
    #[instrument(skip(self))]
    pub async fn generate_matches(
        &self,
        tournament_id: TournamentId,
        round_number: Option<i32>,
    ) -> Result<Vec<MatchResponse>, AppError> {
        let tournament = self.load_tournament(tournament_id).await?;

        if tournament.player_count() < 2 {
            return Err(AppError::InvalidState(
                "Tournament needs at least 2 players to generate matches".to_string(),
            ));
        }
        let round_number = match round_number {
            Some(round_number) if round_number > 0 => round_number,
            _ => {
                return Err(AppError::InvalidArgument(
                    "Round number must be a positive integer".to_string(),
                ))
            }
        };
        if tournament.status.is_finished() {
            return Err(AppError::InvalidState(
                "Cannot generate matches for a finished or cancelled tournament".to_string(),
            ));
        }

        let existing = self
            .matches
            .find_matches_by_tournament_and_round(tournament_id, round_number)
            .await?;
        if !existing.is_empty() {
            warn!(
                tournament_id = tournament_id,
                round_number = round_number,
                existing_matches = existing.len(),
                "Round already generated"
            );
            return Err(AppError::InvalidState(format!(
                "Matches for round {} already exist in this tournament",
                round_number
            )));
        }

        let pairing = shuffle_and_pair(self.shuffler.as_ref(), &tournament.player_ids);
        if let Some(bye) = pairing.bye {
            info!(
                tournament_id = tournament_id,
                round_number = round_number,
                user_id = bye,
                "Player receives a bye this round"
            );
        }

        let commit = RoundCommit {
            tournament_id,
            round_number,
            pairings: pairing.pairs,
            promote_tournament: tournament.status == TournamentStatus::Created,
        };
        let saved = self.matches.commit_round(&commit).await?;

        info!(
            tournament_id = tournament_id,
            round_number = round_number,
            match_count = saved.len(),
            promoted = commit.promote_tournament,
            "Round generated"
        );

        self.to_responses(&tournament, saved).await
    }

    /// Records the terminal result of a match, exactly once.
    ///
    /// Result/winner consistency is re-validated here regardless of what the
    /// caller already checked.
    #[instrument(skip(self))]
    pub async fn update_match_result(
        &self,
        match_id: MatchId,
        result: MatchResult,
        winner_id: Option<UserId>,
    ) -> Result<MatchResponse, AppError> {
        let current = self.load_match(match_id).await?;

        if current.is_completed() {
            return Err(already_completed());
        }
        if result == MatchResult::Pending {
            return Err(AppError::InvalidArgument(
                "Result cannot be PENDING when recording an outcome".to_string(),
            ));
        }

        match winner_id {
            Some(winner_id) => {
                if self.user_repository.find_user_by_id(winner_id).await?.is_none() {
                    return Err(AppError::NotFound(format!(
                        "Winner {} not found",
                        winner_id
                    )));
                }
                if !current.involves(winner_id) {
                    return Err(AppError::InvalidArgument(
                        "Winner is not a player of this match".to_string(),
                    ));
                }
                if result == MatchResult::Draw {
                    return Err(AppError::InvalidArgument(
                        "A draw cannot have a winner".to_string(),
                    ));
                }
            }
            None => {
                if result != MatchResult::Draw {
                    return Err(AppError::InvalidArgument(
                        "Non-draw result requires a winner".to_string(),
                    ));
                }
            }
        }

        let updated = match self
            .matches
            .complete_match(match_id, result, winner_id)
            .await?
        {
            CompleteMatchResult::Success(updated) => updated,
            CompleteMatchResult::MatchNotFound => return Err(match_not_found(match_id)),
            CompleteMatchResult::AlreadyCompleted => {
                // Lost a race with a concurrent submission
                warn!(match_id = match_id, "Match completed concurrently");
                return Err(already_completed());
            }
        };

        info!(
            match_id = match_id,
            result = %updated.result,
            winner_id = ?updated.winner_id,
            "Match result recorded"
        );

        let tournament = self.load_tournament(updated.tournament_id).await?;
        let mut responses = self.to_responses(&tournament, vec![updated]).await?;
        responses.pop().ok_or(AppError::Internal)
    }

    #[instrument(skip(self))]
    pub async fn get_match(&self, match_id: MatchId) -> Result<MatchResponse, AppError> {
        let found = self.load_match(match_id).await?;
        let tournament = self.load_tournament(found.tournament_id).await?;

        let mut responses = self.to_responses(&tournament, vec![found]).await?;
        responses.pop().ok_or(AppError::Internal)
    }

    #[instrument(skip(self))]
    pub async fn list_tournament_matches(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<MatchResponse>, AppError> {
        let tournament = self.load_tournament(tournament_id).await?;
        let matches = self.matches.find_matches_by_tournament(tournament_id).await?;
        debug!(tournament_id = tournament_id, match_count = matches.len(), "Matches retrieved");

        self.to_responses(&tournament, matches).await
    }

    async fn load_tournament(&self, tournament_id: TournamentId) -> Result<TournamentModel, AppError> {
        self.tournaments
            .find_tournament_by_id(tournament_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tournament {} not found", tournament_id)))
    }

    async fn load_match(&self, match_id: MatchId) -> Result<MatchModel, AppError> {
        self.matches
            .find_match_by_id(match_id)
            .await?
            .ok_or_else(|| match_not_found(match_id))
    }

    async fn to_responses(
        &self,
        tournament: &TournamentModel,
        matches: Vec<MatchModel>,
    ) -> Result<Vec<MatchResponse>, AppError> {
        let mut ids: Vec<UserId> = matches
            .iter()
            .flat_map(|m| [m.player1_id, m.player2_id])
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let directory = UserService::new(Arc::clone(&self.user_repository))
            .directory(&ids)
            .await?;

        let summary = TournamentSummary {
            id: tournament.id,
            name: tournament.name.clone(),
        };

        Ok(matches
            .into_iter()
            .map(|m| MatchResponse {
                id: m.id,
                tournament: summary.clone(),
                player1: UserSummary::from(&directory[&m.player1_id]),
                player2: UserSummary::from(&directory[&m.player2_id]),
                winner: m
                    .winner_id
                    .and_then(|id| directory.get(&id))
                    .map(UserSummary::from),
                result: m.result,
                status: m.status,
                round_number: m.round_number,
            })
            .collect())
    }
}

fn match_not_found(match_id: MatchId) -> AppError {
    AppError::NotFound(format!("Match {} not found", match_id))
}

fn already_completed() -> AppError {
    AppError::InvalidState(
        "Match already completed; its result cannot be changed".to_string(),
    )
}
