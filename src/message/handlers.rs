use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::MessageService,
    types::{MessageReaderQuery, MessageRequest, MessageResponse},
};
use crate::matches::models::MatchId;
use crate::shared::{AppError, AppState};
use crate::tournament::models::TournamentId;

fn service(state: &AppState) -> MessageService {
    MessageService::new(
        Arc::clone(&state.message_repository),
        Arc::clone(&state.tournament_repository),
        Arc::clone(&state.match_repository),
        Arc::clone(&state.user_repository),
    )
}

/// HTTP handler for posting into a tournament chat
///
/// POST /api/tournaments/:id/messages
#[instrument(name = "send_tournament_message", skip(state, request))]
pub async fn send_tournament_message(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<MessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let message = service(&state)
        .send_tournament_message(tournament_id, request.sender_id, request.content)
        .await?;

    info!(
        tournament_id = tournament_id,
        message_id = message.id,
        "Tournament message stored"
    );
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/tournaments/:id/messages?user_id=
#[instrument(name = "get_tournament_messages", skip(state))]
pub async fn get_tournament_messages(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Query(reader): Query<MessageReaderQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    Ok(Json(
        service(&state)
            .list_tournament_messages(tournament_id, reader.user_id)
            .await?,
    ))
}

/// POST /api/matches/:id/messages
#[instrument(name = "send_match_message", skip(state, request))]
pub async fn send_match_message(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
    Json(request): Json<MessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let message = service(&state)
        .send_match_message(match_id, request.sender_id, request.content)
        .await?;

    info!(match_id = match_id, message_id = message.id, "Match message stored");
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/matches/:id/messages?user_id=
#[instrument(name = "get_match_messages", skip(state))]
pub async fn get_match_messages(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
    Query(reader): Query<MessageReaderQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    Ok(Json(
        service(&state).list_match_messages(match_id, reader.user_id).await?,
    ))
}
