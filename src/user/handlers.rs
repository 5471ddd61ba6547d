use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::UserId,
    service::UserService,
    types::{RegisterUserRequest, UserResponse},
};
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a user
///
/// POST /api/users
#[instrument(name = "register_user", skip(state))]
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service.register_user(request).await?;

    info!(user_id = user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// HTTP handler for fetching a user profile
///
/// GET /api/users/:id
#[instrument(name = "get_user", skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserResponse>, AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    Ok(Json(service.get_user(user_id).await?))
}
