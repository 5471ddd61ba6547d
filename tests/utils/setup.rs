use axum::{http::StatusCode, Router};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use gamehub::{build_router, AppState, InMemoryStore, PlayerShuffler, RandomShuffler};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub store: Arc<InMemoryStore>,
    pub tournament_id: i64,
    pub user_ids: HashMap<String, i64>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    max_players: i32,
    shuffler: Arc<dyn PlayerShuffler>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            max_players: 16,
            shuffler: Arc::new(RandomShuffler),
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_four_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "carol", "dave"])
    }

    pub fn with_max_players(mut self, max_players: i32) -> Self {
        self.max_players = max_players;
        self
    }

    pub fn with_shuffler(mut self, shuffler: impl PlayerShuffler + 'static) -> Self {
        self.shuffler = Arc::new(shuffler);
        self
    }

    /// Registers every player over HTTP, creates a tournament owned by an
    /// organizer and joins the players in the order given.
    pub async fn build(self) -> TestSetup {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            self.shuffler,
        );

        let mut setup = TestSetup {
            app: build_router(state),
            store,
            tournament_id: 0,
            user_ids: HashMap::new(),
        };

        let organizer = setup.register_user("organizer").await;

        for player in &self.players {
            let id = setup.register_user(player).await;
            setup.user_ids.insert(player.clone(), id);
        }

        let (status, tournament) = setup
            .send(
                "POST",
                "/api/tournaments",
                Some(json!({
                    "name": "integration cup",
                    "max_players": self.max_players,
                    "creator_id": organizer,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "tournament creation failed: {}", tournament);
        setup.tournament_id = tournament["id"].as_i64().unwrap();

        for player in &self.players {
            let (status, body) = setup
                .send(
                    "POST",
                    &format!("/api/tournaments/{}/join", setup.tournament_id),
                    Some(json!({ "user_id": setup.user_ids[player] })),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "join failed for {}: {}", player, body);
        }

        setup
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
