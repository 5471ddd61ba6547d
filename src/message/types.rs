use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::MessageId;
use crate::user::models::{UserId, UserModel};

/// Request payload for posting a chat message
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub sender_id: UserId,
    pub content: String,
}

/// Query string identifying who is reading a chat
#[derive(Debug, Deserialize)]
pub struct MessageReaderQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageSender {
    pub id: UserId,
    pub username: String,
}

impl From<&UserModel> for MessageSender {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub id: MessageId,
    pub sender: MessageSender,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}
