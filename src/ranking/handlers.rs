use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{models::TournamentRanking, service::RankingService};
use crate::shared::{AppError, AppState};
use crate::tournament::models::TournamentId;

/// HTTP handler for a tournament's ranking table
///
/// GET /api/tournaments/:id/ranking
#[instrument(name = "get_tournament_ranking", skip(state))]
pub async fn get_tournament_ranking(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentRanking>, AppError> {
    let service = RankingService::new(
        Arc::clone(&state.tournament_repository),
        Arc::clone(&state.match_repository),
        Arc::clone(&state.user_repository),
    );
    Ok(Json(service.get_tournament_ranking(tournament_id).await?))
}
