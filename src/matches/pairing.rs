use rand::seq::SliceRandom;

use crate::user::models::UserId;

/// Source of the player permutation used when pairing a round.
/// Production shuffles uniformly at random; tests inject fixed orders.
pub trait PlayerShuffler: Send + Sync {
    fn shuffle(&self, players: &mut [UserId]);
}

/// Independent uniform shuffle on every call
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomShuffler;

impl PlayerShuffler for RandomShuffler {
    fn shuffle(&self, players: &mut [UserId]) {
        players.shuffle(&mut rand::rng());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub pairs: Vec<(UserId, UserId)>,
    /// Last player of an odd-sized order sits the round out
    pub bye: Option<UserId>,
}

/// Pairs consecutive players: 0-1, 2-3, ...
pub fn pair_players(order: &[UserId]) -> Pairing {
    let chunks = order.chunks_exact(2);
    let bye = chunks.remainder().first().copied();
    let pairs = chunks.map(|pair| (pair[0], pair[1])).collect();

    Pairing { pairs, bye }
}

/// Shuffles the roster with the given source and pairs the result
pub fn shuffle_and_pair(shuffler: &dyn PlayerShuffler, roster: &[UserId]) -> Pairing {
    let mut order = roster.to_vec();
    shuffler.shuffle(&mut order);
    pair_players(&order)
}
