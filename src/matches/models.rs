use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::tournament::models::TournamentId;
use crate::user::models::UserId;

pub type MatchId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Pending,
    InProgress,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchResult {
    Pending, // Initial marker only, never a recordable outcome
    #[strum(serialize = "PLAYER1_WINS")]
    #[serde(rename = "PLAYER1_WINS")]
    Player1Wins,
    #[strum(serialize = "PLAYER2_WINS")]
    #[serde(rename = "PLAYER2_WINS")]
    Player2Wins,
    Draw,
}

/// Database model for matches table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchModel {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub player1_id: UserId,
    pub player2_id: UserId,
    pub winner_id: Option<UserId>, // Set iff result is PLAYER1_WINS or PLAYER2_WINS
    pub result: MatchResult,
    pub status: MatchStatus,
    pub round_number: i32,
}

impl MatchModel {
    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn involves(&self, user_id: UserId) -> bool {
        self.player1_id == user_id || self.player2_id == user_id
    }

    /// The participant who did not win, if the match has a winner
    pub fn loser_id(&self) -> Option<UserId> {
        match self.winner_id {
            Some(winner) if winner == self.player1_id => Some(self.player2_id),
            Some(winner) if winner == self.player2_id => Some(self.player1_id),
            _ => None,
        }
    }
}
