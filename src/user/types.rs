use serde::{Deserialize, Serialize};

use super::models::{Role, UserId, UserModel};

/// Request payload for registering a user
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
}

/// Full user profile
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub points: Option<i32>,
    pub rank: Option<i32>,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            points: user.points,
            rank: user.rank,
        }
    }
}

/// Compact user reference embedded in tournament and match views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl From<&UserModel> for UserSummary {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
