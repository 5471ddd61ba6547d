use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::setup::TestSetup;

// ============================================================================
// HTTP actions
// ============================================================================

impl TestSetup {
    /// Sends a request through the router and returns the status with the
    /// decoded JSON body (`Value::Null` for empty bodies).
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn register_user(&self, username: &str) -> i64 {
        let (status, body) = self
            .send(
                "POST",
                "/api/users",
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    pub fn user_id(&self, username: &str) -> i64 {
        self.user_ids[username]
    }

    pub async fn generate_round(&self, round_number: i32) -> (StatusCode, Value) {
        self.send(
            "POST",
            &format!("/api/matches/generate/{}", self.tournament_id),
            Some(json!({ "round_number": round_number })),
        )
        .await
    }

    pub async fn record_result(
        &self,
        match_id: i64,
        result: &str,
        winner: Option<&str>,
    ) -> (StatusCode, Value) {
        let body = match winner {
            Some(name) => json!({ "result": result, "winner_id": self.user_id(name) }),
            None => json!({ "result": result }),
        };
        self.send("PUT", &format!("/api/matches/{}/result", match_id), Some(body))
            .await
    }

    pub async fn set_status(&self, status: &str) -> (StatusCode, Value) {
        self.send(
            "PUT",
            &format!("/api/tournaments/{}/status", self.tournament_id),
            Some(json!({ "status": status })),
        )
        .await
    }

    pub async fn tournament(&self) -> Value {
        let (status, body) = self
            .send("GET", &format!("/api/tournaments/{}", self.tournament_id), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    pub async fn matches(&self) -> Vec<Value> {
        let (status, body) = self
            .send(
                "GET",
                &format!("/api/matches/tournament/{}", self.tournament_id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().clone()
    }

    pub async fn ranking(&self) -> Value {
        let (status, body) = self
            .send(
                "GET",
                &format!("/api/tournaments/{}/ranking", self.tournament_id),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    /// Posts to a chat; `chat` is the path prefix, e.g. `/api/matches/3`
    pub async fn post_message(&self, chat: &str, sender_id: i64, content: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            &format!("{}/messages", chat),
            Some(json!({ "sender_id": sender_id, "content": content })),
        )
        .await
    }

    pub async fn read_messages(&self, chat: &str, user_id: i64) -> (StatusCode, Value) {
        self.send("GET", &format!("{}/messages?user_id={}", chat, user_id), None)
            .await
    }
}

/// Usernames of both sides of a match, in player1/player2 order
pub fn sides(m: &Value) -> (String, String) {
    (
        m["player1"]["username"].as_str().unwrap().to_string(),
        m["player2"]["username"].as_str().unwrap().to_string(),
    )
}
