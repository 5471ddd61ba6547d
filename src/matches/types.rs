use serde::{Deserialize, Serialize};

use super::models::{MatchId, MatchResult, MatchStatus};
use crate::tournament::models::TournamentId;
use crate::user::{models::UserId, types::UserSummary};

/// Request payload for generating a round of matches
#[derive(Debug, Deserialize)]
pub struct MatchGenerationRequest {
    /// Missing or null is rejected by the service as an invalid argument
    pub round_number: Option<i32>,
}

/// Request payload for recording a match result
#[derive(Debug, Deserialize)]
pub struct MatchResultUpdateRequest {
    pub result: MatchResult,
    pub winner_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
}

/// Match view returned by every match endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResponse {
    pub id: MatchId,
    pub tournament: TournamentSummary,
    pub player1: UserSummary,
    pub player2: UserSummary,
    pub winner: Option<UserSummary>,
    pub result: MatchResult,
    pub status: MatchStatus,
    pub round_number: i32,
}
