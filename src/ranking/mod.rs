pub use handlers::get_tournament_ranking;
pub use models::{PlayerRanking, PlayerStats, TournamentRanking};
pub use service::RankingService;

pub mod calculator;
mod handlers;
pub mod models;
mod service;
