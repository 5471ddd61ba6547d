use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::trace;

use super::models::{PlayerRanking, PlayerStats};
use crate::matches::models::MatchModel;
use crate::user::models::{UserId, UserModel};

/// Tally of completed matches keyed by player, in first-seen order
#[derive(Debug, Default)]
pub struct StatsTally {
    order: Vec<UserId>,
    stats: HashMap<UserId, PlayerStats>,
}

impl StatsTally {
    /// Seeds a zero row for every roster member so the table is roster-complete
    pub fn seeded(roster: &[UserId]) -> Self {
        let mut tally = Self::default();
        for &user_id in roster {
            tally.entry(user_id);
        }
        tally
    }

    /// Applies one completed match. Participants missing from the roster
    /// are added lazily with a zero row.
    pub fn apply(&mut self, completed: &MatchModel) {
        match (completed.winner_id, completed.loser_id()) {
            (Some(winner), Some(loser)) => {
                trace!(match_id = completed.id, winner, loser, "Tallying decided match");
                self.entry(winner).record_win();
                self.entry(loser).record_loss();
            }
            _ => {
                trace!(match_id = completed.id, "Tallying match without winner");
                self.entry(completed.player1_id).record_draw();
                self.entry(completed.player2_id).record_draw();
            }
        }
    }

    pub fn player_ids(&self) -> &[UserId] {
        &self.order
    }

    pub fn get(&self, user_id: UserId) -> Option<&PlayerStats> {
        self.stats.get(&user_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn entry(&mut self, user_id: UserId) -> &mut PlayerStats {
        let order = &mut self.order;
        self.stats.entry(user_id).or_insert_with(|| {
            order.push(user_id);
            PlayerStats::default()
        })
    }
}

/// Tallies the roster and completed matches in one pass
pub fn tally(roster: &[UserId], completed_matches: &[MatchModel]) -> StatsTally {
    let mut tally = StatsTally::seeded(roster);
    for completed in completed_matches {
        tally.apply(completed);
    }
    tally
}

/// Ranking order: total points desc, then games won desc, then username asc
pub fn compare_rankings(a: &PlayerRanking, b: &PlayerRanking) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| b.games_won.cmp(&a.games_won))
        .then_with(|| a.username.cmp(&b.username))
}

/// Turns a tally into sorted ranking rows. `users` must hold every tallied id.
pub fn build_rankings(tally: &StatsTally, users: &HashMap<UserId, UserModel>) -> Vec<PlayerRanking> {
    let mut rows: Vec<PlayerRanking> = tally
        .player_ids()
        .iter()
        .filter_map(|id| {
            let user = users.get(id)?;
            let stats = tally.get(*id)?;
            Some(PlayerRanking {
                user_id: user.id,
                username: user.username.clone(),
                games_played: stats.games_played,
                games_won: stats.games_won,
                games_lost: stats.games_lost,
                total_points: stats.total_points,
                current_global_rank: user.rank,
            })
        })
        .collect();

    rows.sort_by(compare_rankings);
    rows
}
