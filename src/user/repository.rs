use async_trait::async_trait;

use super::models::{NewUser, UserId, UserModel};
use crate::shared::AppError;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> Result<UserModel, AppError>;
    async fn find_user_by_id(&self, user_id: UserId) -> Result<Option<UserModel>, AppError>;
    async fn find_user_by_username(&self, username: &str)
        -> Result<Option<UserModel>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;

    /// Loads every user whose id is listed; unknown ids are skipped
    async fn find_users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserModel>, AppError>;
}
