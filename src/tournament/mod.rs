// Public API - what other modules can use
pub use handlers::{
    create_tournament, get_tournament, join_tournament, list_tournaments, update_tournament_status,
};
pub use service::TournamentService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
