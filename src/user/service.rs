use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{NewUser, UserId, UserModel},
    repository::UserRepository,
    types::{RegisterUserRequest, UserResponse},
};
use crate::shared::AppError;

/// Service for handling user registration and lookups
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Registers a new player account with a unique username and email
    #[instrument(skip(self))]
    pub async fn register_user(&self, request: RegisterUserRequest) -> Result<UserResponse, AppError> {
        let username = request.username.trim();
        let email = request.email.trim();

        if username.is_empty() || email.is_empty() {
            return Err(AppError::InvalidArgument(
                "Username and email must not be blank".to_string(),
            ));
        }

        if self.repository.find_user_by_username(username).await?.is_some() {
            warn!(username = %username, "Username already taken");
            return Err(AppError::InvalidArgument("Username already exists".to_string()));
        }
        if self.repository.find_user_by_email(email).await?.is_some() {
            warn!(email = %email, "Email already registered");
            return Err(AppError::InvalidArgument("Email already exists".to_string()));
        }

        let user = self
            .repository
            .create_user(&NewUser::player(username, email))
            .await?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: UserId) -> Result<UserResponse, AppError> {
        self.repository
            .find_user_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Resolves a set of user ids into an id-keyed directory.
    /// Every id must resolve; a dangling reference means the store lost referential integrity.
    pub async fn directory(&self, user_ids: &[UserId]) -> Result<HashMap<UserId, UserModel>, AppError> {
        let users = self.repository.find_users_by_ids(user_ids).await?;
        let directory: HashMap<UserId, UserModel> =
            users.into_iter().map(|user| (user.id, user)).collect();

        if let Some(missing) = user_ids.iter().find(|id| !directory.contains_key(*id)) {
            warn!(user_id = missing, "Referenced user missing from store");
            return Err(AppError::DatabaseError(format!(
                "Referenced user {} does not exist",
                missing
            )));
        }

        debug!(resolved = directory.len(), "Resolved user directory");
        Ok(directory)
    }
}
