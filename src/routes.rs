use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{matches, message, ranking, shared::AppState, tournament, user};

/// Builds the full HTTP API on top of the given state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/users", post(user::register_user))
        .route("/api/users/:id", get(user::get_user))
        .route(
            "/api/tournaments",
            post(tournament::create_tournament).get(tournament::list_tournaments),
        )
        .route("/api/tournaments/:id", get(tournament::get_tournament))
        .route("/api/tournaments/:id/join", post(tournament::join_tournament))
        .route(
            "/api/tournaments/:id/status",
            put(tournament::update_tournament_status),
        )
        .route(
            "/api/tournaments/:id/ranking",
            get(ranking::get_tournament_ranking),
        )
        .route(
            "/api/tournaments/:id/messages",
            post(message::send_tournament_message).get(message::get_tournament_messages),
        )
        .route(
            "/api/matches/generate/:tournament_id",
            post(matches::generate_matches),
        )
        .route("/api/matches/:id", get(matches::get_match))
        .route("/api/matches/:id/result", put(matches::update_match_result))
        .route(
            "/api/matches/:id/messages",
            post(message::send_match_message).get(message::get_match_messages),
        )
        .route(
            "/api/matches/tournament/:tournament_id",
            get(matches::list_tournament_matches),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
