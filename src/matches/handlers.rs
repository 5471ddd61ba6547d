use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::MatchId,
    service::MatchService,
    types::{MatchGenerationRequest, MatchResponse, MatchResultUpdateRequest},
};
use crate::shared::{AppError, AppState};
use crate::tournament::models::TournamentId;

fn service(state: &AppState) -> MatchService {
    MatchService::new(
        Arc::clone(&state.match_repository),
        Arc::clone(&state.tournament_repository),
        Arc::clone(&state.user_repository),
        Arc::clone(&state.shuffler),
    )
}

/// HTTP handler for generating one round of matches
///
/// POST /api/matches/generate/:tournament_id
#[instrument(name = "generate_matches", skip(state))]
pub async fn generate_matches(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<MatchGenerationRequest>,
) -> Result<(StatusCode, Json<Vec<MatchResponse>>), AppError> {
    let matches = service(&state)
        .generate_matches(tournament_id, request.round_number)
        .await?;

    info!(
        tournament_id = tournament_id,
        round_number = ?request.round_number,
        match_count = matches.len(),
        "Matches generated successfully"
    );
    Ok((StatusCode::CREATED, Json(matches)))
}

/// GET /api/matches/:id
#[instrument(name = "get_match", skip(state))]
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<MatchResponse>, AppError> {
    Ok(Json(service(&state).get_match(match_id).await?))
}

/// HTTP handler for recording the outcome of a match
///
/// PUT /api/matches/:id/result
#[instrument(name = "update_match_result", skip(state))]
pub async fn update_match_result(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
    Json(request): Json<MatchResultUpdateRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let updated = service(&state)
        .update_match_result(match_id, request.result, request.winner_id)
        .await?;
    Ok(Json(updated))
}

/// GET /api/matches/tournament/:tournament_id
#[instrument(name = "list_tournament_matches", skip(state))]
pub async fn list_tournament_matches(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Vec<MatchResponse>>, AppError> {
    Ok(Json(
        service(&state).list_tournament_matches(tournament_id).await?,
    ))
}
