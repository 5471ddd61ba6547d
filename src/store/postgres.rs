use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, Executor, PgPool, Row};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

use crate::{
    matches::{
        models::{MatchId, MatchModel, MatchResult, MatchStatus},
        repository::{CompleteMatchResult, MatchRepository, RoundCommit},
    },
    message::{
        models::{MessageModel, NewMessage},
        repository::MessageRepository,
    },
    shared::AppError,
    tournament::{
        models::{NewTournament, TournamentId, TournamentModel, TournamentStatus},
        repository::{JoinTournamentResult, TournamentRepository},
    },
    user::{
        models::{NewUser, UserId, UserModel},
        repository::UserRepository,
    },
};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const USER_COLUMNS: &str = "id, username, email, role, points, rank";

const MATCH_COLUMNS: &str =
    "id, tournament_id, player1_id, player2_id, winner_id, result, status, round_number";

const MESSAGE_COLUMNS: &str = "id, sender_id, content, sent_at, tournament_id, match_id";

const TOURNAMENT_SELECT: &str = "SELECT t.id, t.name, t.status, t.max_players, t.created_at, t.creator_id, \
     COALESCE(array_agg(tp.player_id ORDER BY tp.player_id) FILTER (WHERE tp.player_id IS NOT NULL), '{}') AS player_ids \
     FROM tournaments t \
     LEFT JOIN tournament_players tp ON tp.tournament_id = t.id";

/// PostgreSQL implementation of every repository
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(db_error("connect"))?;
        Ok(Self::new(pool))
    }

    /// Creates any missing tables and indexes
    pub async fn apply_schema(&self) -> Result<(), AppError> {
        self.pool
            .execute(SCHEMA)
            .await
            .map_err(db_error("apply schema"))?;
        info!("Database schema applied");
        Ok(())
    }
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, context, "Database operation failed");
        AppError::DatabaseError(e.to_string())
    }
}

fn parse_column<T: FromStr>(row: &PgRow, column: &str) -> Result<T, AppError> {
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .map_err(|_| AppError::DatabaseError(format!("Unexpected {} value: {}", column, raw)))
}

fn user_from_row(row: &PgRow) -> Result<UserModel, AppError> {
    Ok(UserModel {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        role: parse_column(row, "role")?,
        points: row.try_get("points")?,
        rank: row.try_get("rank")?,
    })
}

fn tournament_from_row(row: &PgRow) -> Result<TournamentModel, AppError> {
    Ok(TournamentModel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        status: parse_column(row, "status")?,
        max_players: row.try_get("max_players")?,
        created_at: row.try_get("created_at")?,
        creator_id: row.try_get("creator_id")?,
        player_ids: row.try_get("player_ids")?,
    })
}

fn match_from_row(row: &PgRow) -> Result<MatchModel, AppError> {
    Ok(MatchModel {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        player1_id: row.try_get("player1_id")?,
        player2_id: row.try_get("player2_id")?,
        winner_id: row.try_get("winner_id")?,
        result: parse_column(row, "result")?,
        status: parse_column(row, "status")?,
        round_number: row.try_get("round_number")?,
    })
}

fn message_from_row(row: &PgRow) -> Result<MessageModel, AppError> {
    Ok(MessageModel {
        id: row.try_get("id")?,
        sender_id: row.try_get("sender_id")?,
        content: row.try_get("content")?,
        sent_at: row.try_get("sent_at")?,
        tournament_id: row.try_get("tournament_id")?,
        match_id: row.try_get("match_id")?,
    })
}

#[async_trait]
impl UserRepository for PostgresStore {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError> {
        debug!(username = %user.username, "Creating user in database");

        let row = sqlx::query(&format!(
            "INSERT INTO users (username, email, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("create user"))?;

        user_from_row(&row)
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, user_id: UserId) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find user by id"))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find user by username"))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find user by email"))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE id = ANY($1) ORDER BY id",
            USER_COLUMNS
        ))
        .bind(user_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find users by ids"))?;

        rows.iter().map(user_from_row).collect()
    }
}

#[async_trait]
impl TournamentRepository for PostgresStore {
    #[instrument(skip(self, tournament))]
    async fn create_tournament(&self, tournament: &NewTournament) -> Result<TournamentModel, AppError> {
        debug!(name = %tournament.name, "Creating tournament in database");

        let created_at = Utc::now();
        let id: TournamentId = sqlx::query_scalar(
            "INSERT INTO tournaments (name, status, max_players, created_at, creator_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&tournament.name)
        .bind(TournamentStatus::Created.to_string())
        .bind(tournament.max_players)
        .bind(created_at)
        .bind(tournament.creator_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("create tournament"))?;

        Ok(TournamentModel {
            id,
            name: tournament.name.clone(),
            status: TournamentStatus::Created,
            max_players: tournament.max_players,
            created_at,
            creator_id: tournament.creator_id,
            player_ids: Vec::new(),
        })
    }

    #[instrument(skip(self))]
    async fn find_tournament_by_id(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Option<TournamentModel>, AppError> {
        let row = sqlx::query(&format!("{} WHERE t.id = $1 GROUP BY t.id", TOURNAMENT_SELECT))
            .bind(tournament_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find tournament by id"))?;

        row.as_ref().map(tournament_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_tournament_by_name(&self, name: &str) -> Result<Option<TournamentModel>, AppError> {
        let row = sqlx::query(&format!("{} WHERE t.name = $1 GROUP BY t.id", TOURNAMENT_SELECT))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find tournament by name"))?;

        row.as_ref().map(tournament_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_tournaments(&self) -> Result<Vec<TournamentModel>, AppError> {
        let rows = sqlx::query(&format!("{} GROUP BY t.id ORDER BY t.id", TOURNAMENT_SELECT))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list tournaments"))?;

        rows.iter().map(tournament_from_row).collect()
    }

    #[instrument(skip(self, tournament))]
    async fn save_tournament(&self, tournament: &TournamentModel) -> Result<TournamentModel, AppError> {
        // Roster rows belong to try_join_tournament and are left untouched
        let result = sqlx::query(
            "UPDATE tournaments SET name = $2, status = $3, max_players = $4 WHERE id = $1",
        )
        .bind(tournament.id)
        .bind(&tournament.name)
        .bind(tournament.status.to_string())
        .bind(tournament.max_players)
        .execute(&self.pool)
        .await
        .map_err(db_error("update tournament"))?;

        if result.rows_affected() == 0 {
            warn!(tournament_id = tournament.id, "Tournament not found for update");
            return Err(AppError::NotFound("Tournament not found".to_string()));
        }

        debug!(tournament_id = tournament.id, status = %tournament.status, "Tournament saved in database");
        self.find_tournament_by_id(tournament.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tournament not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn try_join_tournament(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> Result<JoinTournamentResult, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin"))?;

        // Row lock serializes concurrent joins on the same tournament
        let row = sqlx::query("SELECT status, max_players FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("lock tournament"))?;

        let row = match row {
            Some(row) => row,
            None => return Ok(JoinTournamentResult::TournamentNotFound),
        };

        let status: TournamentStatus = parse_column(&row, "status")?;
        let max_players: i32 = row.try_get("max_players")?;
        if status != TournamentStatus::Created {
            return Ok(JoinTournamentResult::NotAcceptingPlayers);
        }

        let player_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tournament_players WHERE tournament_id = $1")
                .bind(tournament_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("count roster"))?;
        if player_count >= i64::from(max_players) {
            return Ok(JoinTournamentResult::Full);
        }

        let already_joined: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM tournament_players WHERE tournament_id = $1 AND player_id = $2)",
        )
        .bind(tournament_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("check membership"))?;
        if already_joined {
            return Ok(JoinTournamentResult::AlreadyJoined);
        }

        sqlx::query("INSERT INTO tournament_players (tournament_id, player_id) VALUES ($1, $2)")
            .bind(tournament_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("join tournament"))?;

        tx.commit().await.map_err(db_error("commit"))?;

        info!(tournament_id = tournament_id, user_id = user_id, "Player joined tournament (atomic)");

        Ok(match self.find_tournament_by_id(tournament_id).await? {
            Some(updated) => JoinTournamentResult::Success(updated),
            None => JoinTournamentResult::TournamentNotFound,
        })
    }
}

#[async_trait]
impl MatchRepository for PostgresStore {
    #[instrument(skip(self))]
    async fn find_match_by_id(&self, match_id: MatchId) -> Result<Option<MatchModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM matches WHERE id = $1", MATCH_COLUMNS))
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find match by id"))?;

        row.as_ref().map(match_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_matches_by_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<MatchModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM matches WHERE tournament_id = $1 ORDER BY id",
            MATCH_COLUMNS
        ))
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find matches by tournament"))?;

        rows.iter().map(match_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn find_matches_by_tournament_and_round(
        &self,
        tournament_id: TournamentId,
        round_number: i32,
    ) -> Result<Vec<MatchModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM matches WHERE tournament_id = $1 AND round_number = $2 ORDER BY id",
            MATCH_COLUMNS
        ))
        .bind(tournament_id)
        .bind(round_number)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find matches by round"))?;

        rows.iter().map(match_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn find_matches_by_tournament_and_status(
        &self,
        tournament_id: TournamentId,
        status: MatchStatus,
    ) -> Result<Vec<MatchModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM matches WHERE tournament_id = $1 AND status = $2 ORDER BY id",
            MATCH_COLUMNS
        ))
        .bind(tournament_id)
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find matches by status"))?;

        rows.iter().map(match_from_row).collect()
    }

    #[instrument(skip(self, commit), fields(tournament_id = commit.tournament_id, round_number = commit.round_number))]
    async fn commit_round(&self, commit: &RoundCommit) -> Result<Vec<MatchModel>, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin"))?;

        // Row lock orders this commit against status updates on the same tournament
        let row = sqlx::query("SELECT status FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(commit.tournament_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("lock tournament"))?;
        let status: TournamentStatus = match row {
            Some(row) => parse_column(&row, "status")?,
            None => return Err(AppError::NotFound("Tournament not found".to_string())),
        };
        if status.is_finished() {
            warn!(status = %status, "Round rejected for finished tournament");
            return Err(AppError::InvalidState(
                "Cannot generate matches for a finished or cancelled tournament".to_string(),
            ));
        }

        let claimed = sqlx::query(
            "INSERT INTO tournament_rounds (tournament_id, round_number) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(commit.tournament_id)
        .bind(commit.round_number)
        .execute(&mut *tx)
        .await
        .map_err(db_error("claim round"))?;

        if claimed.rows_affected() == 0 {
            warn!("Round already claimed in database");
            return Err(AppError::InvalidState(format!(
                "Matches for round {} already exist in this tournament",
                commit.round_number
            )));
        }

        let insert = format!(
            "INSERT INTO matches (tournament_id, player1_id, player2_id, result, status, round_number) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            MATCH_COLUMNS
        );
        let mut saved = Vec::with_capacity(commit.pairings.len());
        for &(player1_id, player2_id) in &commit.pairings {
            let row = sqlx::query(&insert)
                .bind(commit.tournament_id)
                .bind(player1_id)
                .bind(player2_id)
                .bind(MatchResult::Pending.to_string())
                .bind(MatchStatus::Pending.to_string())
                .bind(commit.round_number)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("insert match"))?;
            saved.push(match_from_row(&row)?);
        }

        if commit.promote_tournament {
            sqlx::query("UPDATE tournaments SET status = $2 WHERE id = $1 AND status = $3")
                .bind(commit.tournament_id)
                .bind(TournamentStatus::InProgress.to_string())
                .bind(TournamentStatus::Created.to_string())
                .execute(&mut *tx)
                .await
                .map_err(db_error("promote tournament"))?;
        }

        tx.commit().await.map_err(db_error("commit"))?;

        debug!(match_count = saved.len(), "Round committed in database");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn complete_match(
        &self,
        match_id: MatchId,
        result: MatchResult,
        winner_id: Option<UserId>,
    ) -> Result<CompleteMatchResult, AppError> {
        // Compare-and-set on status; a concurrent completion makes this a no-op
        let row = sqlx::query(&format!(
            "UPDATE matches SET winner_id = $2, result = $3, status = $4 \
             WHERE id = $1 AND status <> $4 RETURNING {}",
            MATCH_COLUMNS
        ))
        .bind(match_id)
        .bind(winner_id)
        .bind(result.to_string())
        .bind(MatchStatus::Completed.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("complete match"))?;

        if let Some(row) = row {
            return Ok(CompleteMatchResult::Success(match_from_row(&row)?));
        }

        Ok(match self.find_match_by_id(match_id).await? {
            Some(_) => CompleteMatchResult::AlreadyCompleted,
            None => CompleteMatchResult::MatchNotFound,
        })
    }
}

#[async_trait]
impl MessageRepository for PostgresStore {
    #[instrument(skip(self, message), fields(sender_id = message.sender_id))]
    async fn create_message(&self, message: &NewMessage) -> Result<MessageModel, AppError> {
        let row = sqlx::query(&format!(
            "INSERT INTO messages (sender_id, content, sent_at, tournament_id, match_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            MESSAGE_COLUMNS
        ))
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(Utc::now())
        .bind(message.tournament_id())
        .bind(message.match_id())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("create message"))?;

        message_from_row(&row)
    }

    #[instrument(skip(self))]
    async fn find_messages_by_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<MessageModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM messages WHERE tournament_id = $1 ORDER BY sent_at, id",
            MESSAGE_COLUMNS
        ))
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find tournament messages"))?;

        rows.iter().map(message_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn find_messages_by_match(&self, match_id: MatchId) -> Result<Vec<MessageModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM messages WHERE match_id = $1 ORDER BY sent_at, id",
            MESSAGE_COLUMNS
        ))
        .bind(match_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find match messages"))?;

        rows.iter().map(message_from_row).collect()
    }
}
