// Public API - what other modules can use
pub use handlers::{
    get_match_messages, get_tournament_messages, send_match_message, send_tournament_message,
};
pub use service::MessageService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
