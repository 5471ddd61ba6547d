use serde::{Deserialize, Serialize};

use crate::tournament::models::TournamentId;
use crate::user::models::UserId;

/// Points awarded per win; draws and losses are worth nothing
pub const WIN_POINTS: u32 = 3;

/// Per-player counters accumulated from completed matches.
/// Never persisted; rebuilt on every ranking request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub total_points: u32,
}

impl PlayerStats {
    pub fn record_win(&mut self) {
        self.games_played += 1;
        self.games_won += 1;
        self.total_points += WIN_POINTS;
    }

    pub fn record_loss(&mut self) {
        self.games_played += 1;
        self.games_lost += 1;
    }

    pub fn record_draw(&mut self) {
        self.games_played += 1;
    }
}

/// One row of a tournament ranking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRanking {
    pub user_id: UserId,
    pub username: String,
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub total_points: u32,
    pub current_global_rank: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentRanking {
    pub tournament_id: TournamentId,
    pub tournament_name: String,
    pub ranking: Vec<PlayerRanking>,
}
