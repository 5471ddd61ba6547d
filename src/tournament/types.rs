use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{TournamentId, TournamentStatus};
use crate::user::{models::UserId, types::UserSummary};

/// Request payload for creating a tournament
#[derive(Debug, Deserialize)]
pub struct TournamentCreateRequest {
    pub name: String,
    pub max_players: i32,
    pub creator_id: UserId,
}

/// Request payload for joining a tournament
#[derive(Debug, Deserialize)]
pub struct JoinTournamentRequest {
    pub user_id: UserId,
}

/// Request payload for moving a tournament to another status
#[derive(Debug, Deserialize)]
pub struct TournamentStatusRequest {
    pub status: TournamentStatus,
}

/// Response for tournament creation and tournament information
#[derive(Debug, Serialize, Deserialize)]
pub struct TournamentResponse {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub max_players: i32,
    pub created_at: DateTime<Utc>,
    pub creator: UserSummary,
    pub players: Vec<UserSummary>,
}
