// Library crate for the tournament server
// This file exposes the public API for integration tests

pub mod config;
pub mod matches;
pub mod message;
pub mod ranking;
pub mod routes;
pub mod shared;
pub mod store;
pub mod tournament;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use matches::{
    models::{MatchModel, MatchResult, MatchStatus},
    pairing::{PlayerShuffler, RandomShuffler},
    MatchService,
};
pub use message::MessageService;
pub use ranking::{RankingService, TournamentRanking};
pub use routes::build_router;
pub use shared::{AppError, AppState};
pub use store::{InMemoryStore, PostgresStore};
pub use tournament::{
    models::{TournamentModel, TournamentStatus},
    TournamentService,
};
pub use user::{models::UserModel, UserService};
