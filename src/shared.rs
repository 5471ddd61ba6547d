use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::matches::{pairing::PlayerShuffler, repository::MatchRepository};
use crate::message::repository::MessageRepository;
use crate::tournament::repository::TournamentRepository;
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository>,
    pub tournament_repository: Arc<dyn TournamentRepository>,
    pub match_repository: Arc<dyn MatchRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub shuffler: Arc<dyn PlayerShuffler>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        tournament_repository: Arc<dyn TournamentRepository>,
        match_repository: Arc<dyn MatchRepository>,
        message_repository: Arc<dyn MessageRepository>,
        shuffler: Arc<dyn PlayerShuffler>,
    ) -> Self {
        Self {
            user_repository,
            tournament_repository,
            match_repository,
            message_repository,
            shuffler,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidState(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
