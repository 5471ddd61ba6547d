// Public API - what other modules can use
pub use handlers::{generate_matches, get_match, list_tournament_matches, update_match_result};
pub use service::MatchService;

// Internal modules
mod handlers;
pub mod models;
pub mod pairing;
pub mod repository;
mod service;
pub mod types;
