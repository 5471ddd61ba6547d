use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Player,
    Admin,
}

/// Database model for users table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserModel {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub points: Option<i32>, // Informational seed value, never written by ranking
    pub rank: Option<i32>,   // Global rank, copied into tournament rankings as-is
}

/// Insert payload for a user; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl NewUser {
    pub fn player(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            role: Role::Player,
        }
    }
}
