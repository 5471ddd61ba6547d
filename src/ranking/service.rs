use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    calculator::{build_rankings, tally},
    models::TournamentRanking,
};
use crate::{
    matches::{models::MatchStatus, repository::MatchRepository},
    shared::AppError,
    tournament::{models::TournamentId, repository::TournamentRepository},
    user::{repository::UserRepository, UserService},
};

/// Computes tournament-scoped rankings from completed matches.
///
/// Pure read: nothing is cached or written back, every call recomputes the
/// whole table. The roster read and the match read are separate, so a match
/// committed in between may already be reflected.
pub struct RankingService {
    tournaments: Arc<dyn TournamentRepository>,
    matches: Arc<dyn MatchRepository>,
    users: UserService,
}

impl RankingService {
    pub fn new(
        tournaments: Arc<dyn TournamentRepository>,
        matches: Arc<dyn MatchRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            tournaments,
            matches,
            users: UserService::new(user_repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_tournament_ranking(
        &self,
        tournament_id: TournamentId,
    ) -> Result<TournamentRanking, AppError> {
        info!(tournament_id = tournament_id, "Computing tournament ranking");

        let tournament = self
            .tournaments
            .find_tournament_by_id(tournament_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tournament {} not found", tournament_id)))?;

        let completed = self
            .matches
            .find_matches_by_tournament_and_status(tournament_id, MatchStatus::Completed)
            .await?;
        debug!(
            tournament_id = tournament_id,
            completed_matches = completed.len(),
            roster_size = tournament.player_count(),
            "Loaded ranking inputs"
        );

        let tally = tally(&tournament.player_ids, &completed);
        let directory = self.users.directory(tally.player_ids()).await?;
        let ranking = build_rankings(&tally, &directory);

        info!(
            tournament_id = tournament_id,
            players = ranking.len(),
            "Tournament ranking computed"
        );

        Ok(TournamentRanking {
            tournament_id: tournament.id,
            tournament_name: tournament.name,
            ranking,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::{models::MatchResult, repository::RoundCommit};
    use crate::store::InMemoryStore;
    use crate::tournament::models::TournamentModel;
    use crate::user::models::{UserId, UserModel};

    async fn setup(names: &[&str]) -> (Arc<InMemoryStore>, RankingService, TournamentModel, Vec<UserModel>) {
        let store = Arc::new(InMemoryStore::new());
        let mut players = Vec::new();
        for name in names {
            players.push(store.seed_user(name).await);
        }
        let ids: Vec<UserId> = players.iter().map(|p| p.id).collect();
        let tournament = store.seed_tournament("autumn-cup", 8, &ids).await;
        let service = RankingService::new(store.clone(), store.clone(), store.clone());
        (store, service, tournament, players)
    }

    async fn play(
        store: &InMemoryStore,
        tournament_id: TournamentId,
        round_number: i32,
        pairings: Vec<(UserId, UserId)>,
    ) -> Vec<i64> {
        let saved = store
            .commit_round(&RoundCommit {
                tournament_id,
                round_number,
                pairings,
                promote_tournament: round_number == 1,
            })
            .await
            .unwrap();
        saved.into_iter().map(|m| m.id).collect()
    }

    #[tokio::test]
    async fn test_single_win_among_four_players() {
        let (store, service, tournament, players) =
            setup(&["player1", "player2", "zed", "amy"]).await;
        let ids = play(&store, tournament.id, 1, vec![(players[0].id, players[1].id)]).await;
        store
            .complete_match(ids[0], MatchResult::Player1Wins, Some(players[0].id))
            .await
            .unwrap();

        let table = service.get_tournament_ranking(tournament.id).await.unwrap();
        assert_eq!(table.tournament_id, tournament.id);
        assert_eq!(table.tournament_name, "autumn-cup");

        let order: Vec<&str> = table.ranking.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(order, vec!["player1", "amy", "player2", "zed"]);

        let winner = &table.ranking[0];
        assert_eq!((winner.games_played, winner.games_won, winner.total_points), (1, 1, 3));

        let loser = table.ranking.iter().find(|r| r.username == "player2").unwrap();
        assert_eq!((loser.games_played, loser.games_lost, loser.total_points), (1, 1, 0));

        for untouched in ["amy", "zed"] {
            let row = table.ranking.iter().find(|r| r.username == untouched).unwrap();
            assert_eq!((row.games_played, row.total_points), (0, 0));
        }
    }

    #[tokio::test]
    async fn test_pending_matches_are_ignored() {
        let (store, service, tournament, players) = setup(&["alice", "bob"]).await;
        play(&store, tournament.id, 1, vec![(players[0].id, players[1].id)]).await;

        let table = service.get_tournament_ranking(tournament.id).await.unwrap();
        assert!(table.ranking.iter().all(|r| r.games_played == 0));
        assert_eq!(table.ranking.len(), 2);
    }

    #[tokio::test]
    async fn test_ties_resolved_by_wins_then_username() {
        let (store, service, tournament, p) = setup(&["dora", "cleo", "bert", "abe"]).await;

        // Round 1: dora beats cleo, bert beats abe
        let r1 = play(&store, tournament.id, 1, vec![(p[0].id, p[1].id), (p[2].id, p[3].id)]).await;
        store.complete_match(r1[0], MatchResult::Player1Wins, Some(p[0].id)).await.unwrap();
        store.complete_match(r1[1], MatchResult::Player1Wins, Some(p[2].id)).await.unwrap();

        let table = service.get_tournament_ranking(tournament.id).await.unwrap();
        let order: Vec<&str> = table.ranking.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(order, vec!["bert", "dora", "abe", "cleo"]);
    }

    #[tokio::test]
    async fn test_removed_player_still_ranked() {
        let (store, service, tournament, players) = setup(&["alice", "bob"]).await;
        let ids = play(&store, tournament.id, 1, vec![(players[0].id, players[1].id)]).await;
        store
            .complete_match(ids[0], MatchResult::Player2Wins, Some(players[1].id))
            .await
            .unwrap();

        store.remove_player(tournament.id, players[1].id).await;

        let table = service.get_tournament_ranking(tournament.id).await.unwrap();
        assert_eq!(table.ranking.len(), 2);
        assert_eq!(table.ranking[0].username, "bob");
        assert_eq!(table.ranking[0].total_points, 3);
    }

    #[tokio::test]
    async fn test_ranking_unknown_tournament() {
        let (_, service, _, _) = setup(&["alice"]).await;

        let result = service.get_tournament_ranking(12345).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
