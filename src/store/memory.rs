use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::{
    matches::{
        models::{MatchId, MatchModel, MatchResult, MatchStatus},
        repository::{CompleteMatchResult, MatchRepository, RoundCommit},
    },
    message::{
        models::{MessageId, MessageModel, NewMessage},
        repository::MessageRepository,
    },
    shared::AppError,
    tournament::{
        models::{NewTournament, TournamentId, TournamentModel, TournamentStatus},
        repository::{JoinTournamentResult, TournamentRepository},
    },
    user::{
        models::{NewUser, Role, UserId, UserModel},
        repository::UserRepository,
    },
};

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<UserId, UserModel>,
    tournaments: BTreeMap<TournamentId, TournamentModel>,
    matches: BTreeMap<MatchId, MatchModel>,
    messages: BTreeMap<MessageId, MessageModel>,
    claimed_rounds: HashSet<(TournamentId, i32)>,
    last_user_id: UserId,
    last_tournament_id: TournamentId,
    last_match_id: MatchId,
    last_message_id: MessageId,
}

/// In-memory implementation of every repository for development and testing
///
/// All aggregates live behind a single lock, so a round commit (matches plus
/// tournament promotion) is applied as one unit. Data is lost when the
/// application restarts.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    tournament_writes: AtomicUsize,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tournament row writes so far (saves and round promotions).
    /// Roster joins are not counted.
    pub fn tournament_writes(&self) -> usize {
        self.tournament_writes.load(Ordering::SeqCst)
    }

    /// Inserts a player named `username` with a derived email address
    pub async fn seed_user(&self, username: &str) -> UserModel {
        let mut state = self.state.write().await;
        insert_user(
            &mut state,
            &NewUser::player(username, format!("{}@example.com", username)),
        )
    }

    /// Inserts an admin account
    pub async fn seed_admin(&self, username: &str) -> UserModel {
        let mut state = self.state.write().await;
        insert_user(
            &mut state,
            &NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                role: Role::Admin,
            },
        )
    }

    /// Inserts a CREATED tournament with the given roster. The first roster
    /// player becomes the creator; an empty roster gets a dedicated organizer.
    pub async fn seed_tournament(
        &self,
        name: &str,
        max_players: i32,
        player_ids: &[UserId],
    ) -> TournamentModel {
        let creator_id = match player_ids.first() {
            Some(id) => *id,
            None => self.seed_user(&format!("{}-organizer", name)).await.id,
        };

        let mut state = self.state.write().await;
        let mut tournament = insert_tournament(
            &mut state,
            &NewTournament {
                name: name.to_string(),
                max_players,
                creator_id,
            },
        );
        tournament.player_ids = player_ids.to_vec();
        state.tournaments.insert(tournament.id, tournament.clone());
        tournament
    }

    /// Drops a player from a tournament roster, leaving their matches in place
    pub async fn remove_player(&self, tournament_id: TournamentId, user_id: UserId) {
        let mut state = self.state.write().await;
        if let Some(tournament) = state.tournaments.get_mut(&tournament_id) {
            tournament.player_ids.retain(|id| *id != user_id);
        }
    }
}

fn finished_tournament() -> AppError {
    AppError::InvalidState(
        "Cannot generate matches for a finished or cancelled tournament".to_string(),
    )
}

fn insert_user(state: &mut StoreState, user: &NewUser) -> UserModel {
    state.last_user_id += 1;
    let model = UserModel {
        id: state.last_user_id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
        points: None,
        rank: None,
    };
    state.users.insert(model.id, model.clone());
    model
}

fn insert_tournament(state: &mut StoreState, tournament: &NewTournament) -> TournamentModel {
    state.last_tournament_id += 1;
    let model = TournamentModel {
        id: state.last_tournament_id,
        name: tournament.name.clone(),
        status: TournamentStatus::Created,
        max_players: tournament.max_players,
        created_at: Utc::now(),
        creator_id: tournament.creator_id,
        player_ids: Vec::new(),
    };
    state.tournaments.insert(model.id, model.clone());
    model
}

#[async_trait]
impl UserRepository for InMemoryStore {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError> {
        debug!(username = %user.username, "Creating user in memory");

        let mut state = self.state.write().await;
        let taken = state
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            warn!(username = %user.username, "User already exists in memory");
            return Err(AppError::DatabaseError("User already exists".to_string()));
        }

        Ok(insert_user(&mut state, user))
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, user_id: UserId) -> Result<Option<UserModel>, AppError> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn find_users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserModel>, AppError> {
        let state = self.state.read().await;
        let wanted: HashSet<&UserId> = user_ids.iter().collect();
        Ok(state
            .users
            .values()
            .filter(|u| wanted.contains(&u.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TournamentRepository for InMemoryStore {
    #[instrument(skip(self, tournament))]
    async fn create_tournament(&self, tournament: &NewTournament) -> Result<TournamentModel, AppError> {
        debug!(name = %tournament.name, "Creating tournament in memory");

        let mut state = self.state.write().await;
        if state.tournaments.values().any(|t| t.name == tournament.name) {
            warn!(name = %tournament.name, "Tournament already exists in memory");
            return Err(AppError::DatabaseError("Tournament already exists".to_string()));
        }

        Ok(insert_tournament(&mut state, tournament))
    }

    #[instrument(skip(self))]
    async fn find_tournament_by_id(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Option<TournamentModel>, AppError> {
        let state = self.state.read().await;
        let tournament = state.tournaments.get(&tournament_id).cloned();

        match &tournament {
            Some(t) => debug!(tournament_id = tournament_id, name = %t.name, "Tournament found in memory"),
            None => debug!(tournament_id = tournament_id, "Tournament not found in memory"),
        }

        Ok(tournament)
    }

    #[instrument(skip(self))]
    async fn find_tournament_by_name(&self, name: &str) -> Result<Option<TournamentModel>, AppError> {
        let state = self.state.read().await;
        Ok(state.tournaments.values().find(|t| t.name == name).cloned())
    }

    #[instrument(skip(self))]
    async fn list_tournaments(&self) -> Result<Vec<TournamentModel>, AppError> {
        let state = self.state.read().await;
        Ok(state.tournaments.values().cloned().collect())
    }

    #[instrument(skip(self, tournament))]
    async fn save_tournament(&self, tournament: &TournamentModel) -> Result<TournamentModel, AppError> {
        let mut state = self.state.write().await;
        match state.tournaments.get_mut(&tournament.id) {
            Some(existing) => {
                // Roster is owned by try_join_tournament
                existing.name = tournament.name.clone();
                existing.status = tournament.status;
                existing.max_players = tournament.max_players;
                self.tournament_writes.fetch_add(1, Ordering::SeqCst);
                debug!(tournament_id = tournament.id, status = %tournament.status, "Tournament saved in memory");
                Ok(existing.clone())
            }
            None => {
                warn!(tournament_id = tournament.id, "Tournament not found for update in memory");
                Err(AppError::NotFound("Tournament not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn try_join_tournament(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> Result<JoinTournamentResult, AppError> {
        let mut state = self.state.write().await;

        let tournament = match state.tournaments.get_mut(&tournament_id) {
            Some(tournament) => tournament,
            None => return Ok(JoinTournamentResult::TournamentNotFound),
        };

        if tournament.status != TournamentStatus::Created {
            return Ok(JoinTournamentResult::NotAcceptingPlayers);
        }
        if tournament.is_full() {
            debug!(tournament_id = tournament_id, "Tournament is full");
            return Ok(JoinTournamentResult::Full);
        }
        if tournament.has_player(user_id) {
            return Ok(JoinTournamentResult::AlreadyJoined);
        }

        tournament.player_ids.push(user_id);

        info!(
            tournament_id = tournament_id,
            user_id = user_id,
            player_count = tournament.player_count(),
            "Player joined tournament (atomic)"
        );

        Ok(JoinTournamentResult::Success(tournament.clone()))
    }
}

#[async_trait]
impl MatchRepository for InMemoryStore {
    #[instrument(skip(self))]
    async fn find_match_by_id(&self, match_id: MatchId) -> Result<Option<MatchModel>, AppError> {
        Ok(self.state.read().await.matches.get(&match_id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_matches_by_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<MatchModel>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn find_matches_by_tournament_and_round(
        &self,
        tournament_id: TournamentId,
        round_number: i32,
    ) -> Result<Vec<MatchModel>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id && m.round_number == round_number)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn find_matches_by_tournament_and_status(
        &self,
        tournament_id: TournamentId,
        status: MatchStatus,
    ) -> Result<Vec<MatchModel>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id && m.status == status)
            .cloned()
            .collect())
    }

    #[instrument(skip(self, commit), fields(tournament_id = commit.tournament_id, round_number = commit.round_number))]
    async fn commit_round(&self, commit: &RoundCommit) -> Result<Vec<MatchModel>, AppError> {
        let mut state = self.state.write().await;
        let state = &mut *state;

        match state.tournaments.get(&commit.tournament_id) {
            None => return Err(AppError::NotFound("Tournament not found".to_string())),
            Some(tournament) if tournament.status.is_finished() => {
                warn!(status = %tournament.status, "Round rejected for finished tournament");
                return Err(finished_tournament());
            }
            Some(_) => {}
        }

        let round_key = (commit.tournament_id, commit.round_number);
        let has_matches = state
            .matches
            .values()
            .any(|m| m.tournament_id == commit.tournament_id && m.round_number == commit.round_number);
        if has_matches || !state.claimed_rounds.insert(round_key) {
            warn!("Round already claimed in memory");
            return Err(AppError::InvalidState(format!(
                "Matches for round {} already exist in this tournament",
                commit.round_number
            )));
        }

        let mut saved = Vec::with_capacity(commit.pairings.len());
        for &(player1_id, player2_id) in &commit.pairings {
            state.last_match_id += 1;
            let model = MatchModel {
                id: state.last_match_id,
                tournament_id: commit.tournament_id,
                player1_id,
                player2_id,
                winner_id: None,
                result: MatchResult::Pending,
                status: MatchStatus::Pending,
                round_number: commit.round_number,
            };
            state.matches.insert(model.id, model.clone());
            saved.push(model);
        }

        if commit.promote_tournament {
            if let Some(tournament) = state.tournaments.get_mut(&commit.tournament_id) {
                if tournament.status == TournamentStatus::Created {
                    tournament.status = TournamentStatus::InProgress;
                    self.tournament_writes.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        debug!(match_count = saved.len(), "Round committed in memory");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn complete_match(
        &self,
        match_id: MatchId,
        result: MatchResult,
        winner_id: Option<UserId>,
    ) -> Result<CompleteMatchResult, AppError> {
        let mut state = self.state.write().await;

        let stored = match state.matches.get_mut(&match_id) {
            Some(stored) => stored,
            None => return Ok(CompleteMatchResult::MatchNotFound),
        };

        if stored.is_completed() {
            return Ok(CompleteMatchResult::AlreadyCompleted);
        }

        stored.winner_id = winner_id;
        stored.result = result;
        stored.status = MatchStatus::Completed;

        debug!(match_id = match_id, result = %result, "Match completed in memory");
        Ok(CompleteMatchResult::Success(stored.clone()))
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    #[instrument(skip(self, message), fields(sender_id = message.sender_id))]
    async fn create_message(&self, message: &NewMessage) -> Result<MessageModel, AppError> {
        let mut state = self.state.write().await;

        let chat_exists = match (message.tournament_id(), message.match_id()) {
            (Some(tournament_id), _) => state.tournaments.contains_key(&tournament_id),
            (_, Some(match_id)) => state.matches.contains_key(&match_id),
            (None, None) => false,
        };
        if !chat_exists {
            warn!(target_chat = ?message.target, "Chat not found for message in memory");
            return Err(AppError::NotFound("Chat not found".to_string()));
        }

        state.last_message_id += 1;
        let model = MessageModel {
            id: state.last_message_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            sent_at: Utc::now(),
            tournament_id: message.tournament_id(),
            match_id: message.match_id(),
        };
        state.messages.insert(model.id, model.clone());

        debug!(message_id = model.id, "Message stored in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn find_messages_by_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<MessageModel>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .values()
            .filter(|m| m.tournament_id == Some(tournament_id))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn find_messages_by_match(&self, match_id: MatchId) -> Result<Vec<MessageModel>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .values()
            .filter(|m| m.match_id == Some(match_id))
            .cloned()
            .collect())
    }
}
