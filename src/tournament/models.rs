use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::user::models::UserId;

pub type TournamentId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    Created,
    InProgress,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    /// COMPLETED and CANCELLED tournaments accept no further rounds
    pub fn is_finished(&self) -> bool {
        matches!(self, TournamentStatus::Completed | TournamentStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: TournamentStatus) -> bool {
        use TournamentStatus::*;
        matches!(
            (self, next),
            (Created, InProgress) | (Created, Cancelled) | (InProgress, Completed) | (InProgress, Cancelled)
        )
    }
}

/// Database model for tournaments table, roster included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentModel {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub max_players: i32,
    pub created_at: DateTime<Utc>,
    pub creator_id: UserId,
    pub player_ids: Vec<UserId>, // Roster; order carries no meaning
}

impl TournamentModel {
    pub fn player_count(&self) -> usize {
        self.player_ids.len()
    }

    pub fn has_player(&self, user_id: UserId) -> bool {
        self.player_ids.contains(&user_id)
    }

    pub fn is_full(&self) -> bool {
        self.player_ids.len() >= self.max_players.max(0) as usize
    }
}

/// Insert payload for a tournament; the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewTournament {
    pub name: String,
    pub max_players: i32,
    pub creator_id: UserId,
}
