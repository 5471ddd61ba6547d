use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::TournamentId,
    service::TournamentService,
    types::{
        JoinTournamentRequest, TournamentCreateRequest, TournamentResponse,
        TournamentStatusRequest,
    },
};
use crate::shared::{AppError, AppState};

fn service(state: &AppState) -> TournamentService {
    TournamentService::new(
        Arc::clone(&state.tournament_repository),
        Arc::clone(&state.user_repository),
    )
}

/// HTTP handler for creating a new tournament
///
/// POST /api/tournaments
#[instrument(name = "create_tournament", skip(state))]
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(request): Json<TournamentCreateRequest>,
) -> Result<(StatusCode, Json<TournamentResponse>), AppError> {
    let tournament = service(&state).create_tournament(request).await?;

    info!(tournament_id = tournament.id, "Tournament created successfully");
    Ok((StatusCode::CREATED, Json(tournament)))
}

/// HTTP handler for listing all tournaments
///
/// GET /api/tournaments
#[instrument(name = "list_tournaments", skip(state))]
pub async fn list_tournaments(
    State(state): State<AppState>,
) -> Result<Json<Vec<TournamentResponse>>, AppError> {
    Ok(Json(service(&state).list_tournaments().await?))
}

/// GET /api/tournaments/:id
#[instrument(name = "get_tournament", skip(state))]
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentResponse>, AppError> {
    Ok(Json(service(&state).get_tournament(tournament_id).await?))
}

/// POST /api/tournaments/:id/join
#[instrument(name = "join_tournament", skip(state))]
pub async fn join_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<JoinTournamentRequest>,
) -> Result<Json<TournamentResponse>, AppError> {
    let tournament = service(&state)
        .join_tournament(tournament_id, request.user_id)
        .await?;
    Ok(Json(tournament))
}

/// PUT /api/tournaments/:id/status
#[instrument(name = "update_tournament_status", skip(state))]
pub async fn update_tournament_status(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<TournamentStatusRequest>,
) -> Result<Json<TournamentResponse>, AppError> {
    let tournament = service(&state)
        .update_tournament_status(tournament_id, request.status)
        .await?;
    Ok(Json(tournament))
}
