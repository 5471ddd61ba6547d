use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matches::models::MatchId;
use crate::tournament::models::TournamentId;
use crate::user::models::UserId;

pub type MessageId = i64;

/// Longest accepted chat message, in characters
pub const MAX_CONTENT_CHARS: usize = 500;

/// Chat a message belongs to; exactly one per message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTarget {
    Tournament(TournamentId),
    Match(MatchId),
}

/// Database model for messages table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageModel {
    pub id: MessageId,
    pub sender_id: UserId,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub tournament_id: Option<TournamentId>,
    pub match_id: Option<MatchId>,
}

impl MessageModel {
    pub fn target(&self) -> Option<MessageTarget> {
        match (self.tournament_id, self.match_id) {
            (Some(tournament_id), None) => Some(MessageTarget::Tournament(tournament_id)),
            (None, Some(match_id)) => Some(MessageTarget::Match(match_id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub content: String,
    pub target: MessageTarget,
}

impl NewMessage {
    pub fn tournament_id(&self) -> Option<TournamentId> {
        match self.target {
            MessageTarget::Tournament(id) => Some(id),
            MessageTarget::Match(_) => None,
        }
    }

    pub fn match_id(&self) -> Option<MatchId> {
        match self.target {
            MessageTarget::Match(id) => Some(id),
            MessageTarget::Tournament(_) => None,
        }
    }
}
