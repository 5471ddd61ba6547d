use axum::http::StatusCode;
use std::collections::HashSet;

mod utils;

use utils::actions::sides;
use utils::*;

#[tokio::test]
async fn test_two_round_tournament_ranking() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_shuffler(ReverseShuffler)
        .build()
        .await;

    // Reversed roster: dave vs carol, bob vs alice
    let (status, round1) = setup.generate_round(1).await;
    assert_eq!(status, StatusCode::CREATED);
    let round1 = round1.as_array().unwrap().clone();
    assert_eq!(round1.len(), 2);
    assert_eq!(sides(&round1[0]), ("dave".to_string(), "carol".to_string()));
    assert_eq!(sides(&round1[1]), ("bob".to_string(), "alice".to_string()));

    assert_eq!(setup.tournament().await["status"], "IN_PROGRESS");
    assert_eq!(setup.store.tournament_writes(), 1);

    let (status, _) = setup
        .record_result(round1[0]["id"].as_i64().unwrap(), "PLAYER1_WINS", Some("dave"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = setup
        .record_result(round1[1]["id"].as_i64().unwrap(), "DRAW", None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, round2) = setup.generate_round(2).await;
    assert_eq!(status, StatusCode::CREATED);
    let round2 = round2.as_array().unwrap().clone();

    // Already IN_PROGRESS, so the second round writes no tournament row
    assert_eq!(setup.store.tournament_writes(), 1);

    setup
        .record_result(round2[0]["id"].as_i64().unwrap(), "PLAYER2_WINS", Some("carol"))
        .await;
    setup
        .record_result(round2[1]["id"].as_i64().unwrap(), "PLAYER1_WINS", Some("bob"))
        .await;

    let ranking = setup.ranking().await;
    assert_eq!(ranking["tournament_name"], "integration cup");

    let rows = ranking["ranking"].as_array().unwrap();
    let order: Vec<&str> = rows
        .iter()
        .map(|r| r["username"].as_str().unwrap())
        .collect();
    // Three players tie on points and wins, broken by username
    assert_eq!(order, vec!["bob", "carol", "dave", "alice"]);

    let alice = &rows[3];
    assert_eq!(alice["games_played"], 2);
    assert_eq!(alice["games_won"], 0);
    assert_eq!(alice["games_lost"], 1);
    assert_eq!(alice["total_points"], 0);

    let bob = &rows[0];
    assert_eq!(bob["games_played"], 2);
    assert_eq!(bob["games_won"], 1);
    assert_eq!(bob["games_lost"], 0);
    assert_eq!(bob["total_points"], 3);
}

#[tokio::test]
async fn test_odd_roster_gives_one_bye() {
    let setup = TestSetupBuilder::new()
        .with_players(vec!["alice", "bob", "carol", "dave", "erin"])
        .with_shuffler(ReverseShuffler)
        .build()
        .await;

    let (status, matches) = setup.generate_round(1).await;
    assert_eq!(status, StatusCode::CREATED);

    let matches = matches.as_array().unwrap();
    assert_eq!(matches.len(), 2);

    let mut paired = HashSet::new();
    for m in matches {
        let (p1, p2) = sides(m);
        assert_ne!(p1, p2);
        assert!(paired.insert(p1));
        assert!(paired.insert(p2));
        assert_eq!(m["status"], "PENDING");
        assert_eq!(m["result"], "PENDING");
        assert!(m["winner"].is_null());
    }

    // Last in reversed order sits out
    assert!(!paired.contains("alice"));
    assert_eq!(paired.len(), 4);
}

#[tokio::test]
async fn test_random_pairing_covers_roster() {
    let setup = TestSetupBuilder::new()
        .with_players(vec!["p1", "p2", "p3", "p4", "p5", "p6", "p7", "p8"])
        .build()
        .await;

    let (status, matches) = setup.generate_round(1).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut paired = HashSet::new();
    for m in matches.as_array().unwrap() {
        let (p1, p2) = sides(m);
        assert!(paired.insert(p1));
        assert!(paired.insert(p2));
    }
    assert_eq!(paired.len(), 8);
}

#[tokio::test]
async fn test_repeated_round_is_rejected_without_writes() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_shuffler(RosterOrderShuffler)
        .build()
        .await;

    let (status, _) = setup.generate_round(1).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = setup.generate_round(1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert_eq!(setup.matches().await.len(), 2);
    assert_eq!(setup.store.tournament_writes(), 1);
}

#[tokio::test]
async fn test_concurrent_generation_commits_once() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_shuffler(RosterOrderShuffler)
        .build()
        .await;

    let (first, second) = tokio::join!(setup.generate_round(1), setup.generate_round(1));

    let mut statuses = vec![first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    assert_eq!(setup.matches().await.len(), 2);
}

#[tokio::test]
async fn test_concurrent_results_record_once() {
    let setup = TestSetupBuilder::new()
        .with_players(vec!["alice", "bob"])
        .with_shuffler(RosterOrderShuffler)
        .build()
        .await;

    let (_, matches) = setup.generate_round(1).await;
    let match_id = matches[0]["id"].as_i64().unwrap();

    let (first, second) = tokio::join!(
        setup.record_result(match_id, "PLAYER1_WINS", Some("alice")),
        setup.record_result(match_id, "PLAYER2_WINS", Some("bob")),
    );

    let successes = [&first, &second]
        .iter()
        .filter(|(status, _)| *status == StatusCode::OK)
        .count();
    assert_eq!(successes, 1);

    let (_, stored) = setup
        .send("GET", &format!("/api/matches/{}", match_id), None)
        .await;
    let winner = stored["winner"]["username"].as_str().unwrap();
    let winning = if first.0 == StatusCode::OK { "alice" } else { "bob" };
    assert_eq!(winner, winning);
}

#[tokio::test]
async fn test_result_validation_errors() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_shuffler(RosterOrderShuffler)
        .build()
        .await;
    let outsider = setup.register_user("mallory").await;

    let (_, matches) = setup.generate_round(1).await;
    // alice vs bob
    let match_id = matches[0]["id"].as_i64().unwrap();

    let (status, _) = setup.record_result(match_id, "PENDING", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = setup.record_result(match_id, "PLAYER1_WINS", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = setup.record_result(match_id, "DRAW", Some("alice")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = setup.record_result(match_id, "PLAYER1_WINS", Some("carol")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = setup
        .send(
            "PUT",
            &format!("/api/matches/{}/result", match_id),
            Some(serde_json::json!({ "result": "PLAYER1_WINS", "winner_id": outsider + 100 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = setup.record_result(9999, "DRAW", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nothing above touched the match
    let (_, stored) = setup
        .send("GET", &format!("/api/matches/{}", match_id), None)
        .await;
    assert_eq!(stored["status"], "PENDING");
    assert_eq!(stored["result"], "PENDING");
}

#[tokio::test]
async fn test_finished_tournament_rejects_generation() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_shuffler(RosterOrderShuffler)
        .build()
        .await;

    setup.generate_round(1).await;
    let (status, body) = setup.set_status("COMPLETED").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");

    let (status, _) = setup.generate_round(2).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Terminal states cannot be left
    let (status, _) = setup.set_status("IN_PROGRESS").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generation_precondition_order() {
    let setup = TestSetupBuilder::new()
        .with_players(vec!["alice"])
        .build()
        .await;

    // Too few players is reported before the bad round number
    let (status, body) = setup.generate_round(0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at least 2 players"));

    let (status, _) = setup
        .send(
            "POST",
            "/api/matches/generate/9999",
            Some(serde_json::json!({ "round_number": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_rules() {
    let setup = TestSetupBuilder::new()
        .with_players(vec!["alice", "bob"])
        .with_max_players(2)
        .build()
        .await;
    let carol = setup.register_user("carol").await;
    let join_uri = format!("/api/tournaments/{}/join", setup.tournament_id);

    let (status, _) = setup
        .send("POST", &join_uri, Some(serde_json::json!({ "user_id": carol })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = setup
        .send(
            "POST",
            &join_uri,
            Some(serde_json::json!({ "user_id": setup.user_id("alice") })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let players = setup.tournament().await["players"].as_array().unwrap().len();
    assert_eq!(players, 2);
}

#[tokio::test]
async fn test_ranking_without_matches() {
    let setup = TestSetupBuilder::new()
        .with_players(vec!["zoe", "adam", "mia"])
        .build()
        .await;

    let ranking = setup.ranking().await;
    let rows = ranking["ranking"].as_array().unwrap();

    let order: Vec<&str> = rows
        .iter()
        .map(|r| r["username"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["adam", "mia", "zoe"]);
    assert!(rows.iter().all(|r| r["games_played"] == 0 && r["total_points"] == 0));
}

#[tokio::test]
async fn test_ranking_for_missing_tournament() {
    let setup = TestSetupBuilder::new().build().await;

    let (status, body) = setup
        .send("GET", "/api/tournaments/4242/ranking", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_tournament_chat_workflow() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_shuffler(RosterOrderShuffler)
        .build()
        .await;
    let outsider = setup.register_user("mallory").await;
    let admin = setup.store.seed_admin("referee").await;
    let chat = format!("/api/tournaments/{}", setup.tournament_id);

    let (status, posted) = setup
        .post_message(&chat, setup.user_id("alice"), "good luck everyone")
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(posted["sender"]["username"], "alice");

    let (status, _) = setup
        .post_message(&chat, admin.id, "round 1 starts in five minutes")
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = setup.post_message(&chat, outsider, "hi all").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = setup.read_messages(&chat, outsider).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = setup.read_messages(&chat, setup.user_id("dave")).await;
    assert_eq!(status, StatusCode::OK);
    let senders: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["sender"]["username"].as_str().unwrap())
        .collect();
    assert_eq!(senders, vec!["alice", "referee"]);
}

#[tokio::test]
async fn test_match_chat_is_limited_to_its_players() {
    let setup = TestSetupBuilder::new()
        .with_four_players()
        .with_shuffler(RosterOrderShuffler)
        .build()
        .await;

    let (_, matches) = setup.generate_round(1).await;
    // alice vs bob
    let chat = format!("/api/matches/{}", matches[0]["id"].as_i64().unwrap());

    let (status, _) = setup
        .post_message(&chat, setup.user_id("bob"), "rematch later?")
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = setup
        .post_message(&chat, setup.user_id("carol"), "who is winning")
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = setup.read_messages(&chat, setup.user_id("alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["content"], "rematch later?");

    let long = "x".repeat(501);
    let (status, _) = setup.post_message(&chat, setup.user_id("alice"), &long).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
